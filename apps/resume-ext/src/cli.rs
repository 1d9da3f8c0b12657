use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::extraction::PageSelector;

#[derive(Parser, Debug)]
#[command(
    name = "resume-ext",
    version,
    about = "Resume text extraction, LLM structuring and field-level evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract every resume in a directory into one JSON record each.
    Extract(ExtractArgs),
    /// Score produced records against golden records.
    Evaluate(EvaluateArgs),
    /// Print the extracted text of a single document.
    Text(TextArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input_dir: PathBuf,

    #[arg(long)]
    pub output_dir: PathBuf,

    /// `all`, a page number (`3`) or an inclusive range (`1-2`).
    #[arg(long, default_value = "all")]
    pub page_range: PageSelector,

    /// Skip the DOCX/DOC to PDF converter even if it is installed.
    #[arg(long, default_value_t = false)]
    pub no_convert: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub produced_dir: PathBuf,

    #[arg(long)]
    pub golden_dir: PathBuf,

    /// Defaults to `<produced-dir>/evaluation_results.csv`.
    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    pub file: PathBuf,

    #[arg(long, default_value = "all")]
    pub page_range: PageSelector,

    /// Print the rendered text without normalization.
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_args_parse() {
        let cli = Cli::try_parse_from([
            "resume-ext",
            "extract",
            "--input-dir",
            "in",
            "--output-dir",
            "out",
            "--page-range",
            "1-2",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.page_range, PageSelector::Range(1, 2));
                assert!(!args.no_convert);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_page_range_is_rejected() {
        let result = Cli::try_parse_from(["resume-ext", "text", "cv.pdf", "--page-range", "x-y"]);
        assert!(result.is_err());
    }
}
