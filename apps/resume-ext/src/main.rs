mod cli;
mod config;
mod errors;
mod evaluation;
mod extraction;
mod llm_client;
mod models;
mod pipeline;
mod state;
mod structuring;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands, EvaluateArgs, ExtractArgs, TextArgs};
use crate::config::Config;
use crate::extraction::extract_document;
use crate::extraction::normalize::normalize;
use crate::llm_client::LlmClient;
use crate::pipeline::convert::{DocumentConverter, SofficeConverter};
use crate::pipeline::discovery::discover_documents;
use crate::pipeline::{run_batch, PipelineOptions};
use crate::state::AppState;
use crate::structuring::LlmStructurer;

const REPORT_FILE_NAME: &str = "evaluation_results.csv";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            std::process::exit(1);
        }
    };

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli, config).await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Extract(args) => run_extract(args, config).await,
        Commands::Evaluate(args) => run_evaluate(args),
        Commands::Text(args) => run_text(args, config).await,
    }
}

async fn run_extract(args: ExtractArgs, config: Config) -> Result<()> {
    info!("Starting resume-ext v{}", env!("CARGO_PKG_VERSION"));

    let api_key = config.require_api_key()?.to_string();
    let llm = LlmClient::new(api_key, config.llm_model.clone(), config.llm_max_tokens)
        .context("failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let converter: Option<Arc<dyn DocumentConverter>> = if args.no_convert {
        None
    } else {
        let soffice = SofficeConverter::new(config.soffice_bin.clone());
        if soffice.is_available() {
            Some(Arc::new(soffice))
        } else {
            warn!(
                "Converter '{}' not found; DOCX is read natively and DOC files will fail",
                config.soffice_bin
            );
            None
        }
    };

    let state = AppState {
        config,
        structurer: Arc::new(LlmStructurer::new(llm)),
        converter,
    };

    let documents = discover_documents(&args.input_dir)?;
    if documents.is_empty() {
        warn!(
            "No .pdf, .doc or .docx files found in {}",
            args.input_dir.display()
        );
    }

    let options = PipelineOptions {
        output_dir: args.output_dir,
        selector: args.page_range,
    };
    let summary = run_batch(&state, &documents, &options).await?;
    summary.log();

    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let report = evaluation::evaluate_dirs(&args.produced_dir, &args.golden_dir)?;

    print!("{}", report.render_table());

    let report_path = args
        .report_path
        .unwrap_or_else(|| args.produced_dir.join(REPORT_FILE_NAME));
    report.write_csv(&report_path)?;
    info!("Evaluation report written to {}", report_path.display());

    Ok(())
}

async fn run_text(args: TextArgs, config: Config) -> Result<()> {
    let path = args.file.clone();
    let selector = args.page_range;
    let document = tokio::task::spawn_blocking(move || extract_document(&path, selector))
        .await
        .context("extraction task failed")?
        .with_context(|| format!("failed to extract {}", args.file.display()))?;

    let rendered = document.render(config.inline_page_diagnostics);
    if args.raw {
        println!("{rendered}");
    } else {
        println!("{}", normalize(&rendered));
    }

    Ok(())
}
