//! Batch pipeline: one document at a time through
//! `Discovered → FormatNormalized → TextExtracted → TextCleaned →
//! RecordRequested → RecordUnwrapped → Written`.
//!
//! A failure at any transition ends processing for that document only. The
//! batch always runs to the end and reports what happened in a
//! `BatchSummary`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::errors::AppError;
use crate::extraction::normalize::normalize;
use crate::extraction::{extract_document, DocumentFormat, ExtractionError, PageSelector};
use crate::state::AppState;
use crate::structuring::unwrap::parse_response;

pub mod convert;
pub mod discovery;
pub mod storage;

/// Per-document processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    Discovered,
    FormatNormalized,
    TextExtracted,
    TextCleaned,
    RecordRequested,
    RecordUnwrapped,
    Written,
}

/// Where a document ended up.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Written {
        path: PathBuf,
        /// The model reply could not be parsed; `raw_text` was written.
        degraded: bool,
    },
    Failed {
        /// Last stage the document completed.
        stage: DocumentStage,
        code: &'static str,
        message: String,
    },
}

#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub outcome: DocumentOutcome,
    /// 0-based indices of selected pages that yielded no text.
    pub empty_pages: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub documents: Vec<DocumentReport>,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Written { .. }))
            .count()
    }

    pub fn degraded(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Written { degraded: true, .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.outcome, DocumentOutcome::Failed { .. }))
            .count()
    }

    /// Logs totals, then one line per degraded or failed document.
    pub fn log(&self) {
        let elapsed = self.finished_at - self.started_at;
        info!(
            total = self.documents.len(),
            written = self.written(),
            degraded = self.degraded(),
            failed = self.failed(),
            elapsed_ms = elapsed.num_milliseconds(),
            "Batch finished"
        );

        for doc in &self.documents {
            match &doc.outcome {
                DocumentOutcome::Written { path, degraded: true } => {
                    warn!(source = %doc.source.display(), output = %path.display(), "Degraded record (raw_text)");
                }
                DocumentOutcome::Failed {
                    stage,
                    code,
                    message,
                } => {
                    warn!(source = %doc.source.display(), ?stage, code, "Skipped: {message}");
                }
                DocumentOutcome::Written { .. } => {}
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub output_dir: PathBuf,
    pub selector: PageSelector,
}

/// Runs every document through the pipeline, sequentially.
///
/// Only command-level problems (output directory cannot be created) are
/// returned as errors; per-document failures land in the summary.
pub async fn run_batch(
    state: &AppState,
    documents: &[PathBuf],
    options: &PipelineOptions,
) -> anyhow::Result<BatchSummary> {
    std::fs::create_dir_all(&options.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            options.output_dir.display()
        )
    })?;

    let started_at = Utc::now();
    info!(
        documents = documents.len(),
        structurer = state.structurer.name(),
        converter = state.converter.as_ref().map(|c| c.name()).unwrap_or("none"),
        pages = %options.selector,
        "Batch started"
    );

    let mut reports = Vec::with_capacity(documents.len());
    for (i, source) in documents.iter().enumerate() {
        info!(
            "[{}/{}] Processing {}",
            i + 1,
            documents.len(),
            source.display()
        );
        reports.push(process_document(state, source, options).await);
    }

    Ok(BatchSummary {
        started_at,
        finished_at: Utc::now(),
        documents: reports,
    })
}

/// Processes one document, never returning an error: failures are folded
/// into the report together with the stage reached.
pub async fn process_document(
    state: &AppState,
    source: &Path,
    options: &PipelineOptions,
) -> DocumentReport {
    let mut progress = Progress {
        stage: DocumentStage::Discovered,
        empty_pages: Vec::new(),
    };

    let outcome = match advance(state, source, options, &mut progress).await {
        Ok((path, degraded)) => DocumentOutcome::Written { path, degraded },
        Err(e) => {
            error!(
                source = %source.display(),
                stage = ?progress.stage,
                code = e.code(),
                "Document failed: {e}"
            );
            DocumentOutcome::Failed {
                stage: progress.stage,
                code: e.code(),
                message: e.to_string(),
            }
        }
    };

    DocumentReport {
        source: source.to_path_buf(),
        outcome,
        empty_pages: progress.empty_pages,
    }
}

struct Progress {
    stage: DocumentStage,
    empty_pages: Vec<usize>,
}

impl Progress {
    fn reach(&mut self, stage: DocumentStage, source: &Path) {
        debug!(source = %source.display(), ?stage, "Stage reached");
        self.stage = stage;
    }
}

async fn advance(
    state: &AppState,
    source: &Path,
    options: &PipelineOptions,
    progress: &mut Progress,
) -> Result<(PathBuf, bool), AppError> {
    let format = DocumentFormat::from_path(source)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(source.display().to_string()))?;

    // The scratch dir holds the converted PDF; it is removed once dropped.
    let (extract_path, scratch) = match (&state.converter, format.is_word_processor()) {
        (Some(converter), true) => {
            let scratch = tempfile::tempdir().map_err(|e| {
                AppError::Internal(anyhow::anyhow!("failed to create scratch dir: {e}"))
            })?;
            let converter = converter.clone();
            let input = source.to_path_buf();
            let out_dir = scratch.path().to_path_buf();
            let pdf = tokio::task::spawn_blocking(move || converter.convert_to_pdf(&input, &out_dir))
                .await
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("spawn_blocking failed in conversion: {e}"))
                })??;
            debug!(source = %source.display(), pdf = %pdf.display(), "Converted to PDF");
            (pdf, Some(scratch))
        }
        _ => (source.to_path_buf(), None),
    };
    progress.reach(DocumentStage::FormatNormalized, source);

    let selector = options.selector;
    let document = tokio::task::spawn_blocking(move || extract_document(&extract_path, selector))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;
    drop(scratch);

    progress.empty_pages = document.empty_pages();
    if !progress.empty_pages.is_empty() {
        warn!(
            source = %source.display(),
            pages = ?progress.empty_pages,
            "Pages with no extractable text"
        );
    }
    progress.reach(DocumentStage::TextExtracted, source);

    let text = normalize(&document.render(state.config.inline_page_diagnostics));
    progress.reach(DocumentStage::TextCleaned, source);

    let reply = state.structurer.structure(&text, source).await?;
    progress.reach(DocumentStage::RecordRequested, source);

    let outcome = parse_response(&reply);
    let degraded = outcome.is_degraded();
    progress.reach(DocumentStage::RecordUnwrapped, source);

    let path = storage::record_path(&options.output_dir, source);
    storage::write_record(&path, &outcome)?;
    progress.reach(DocumentStage::Written, source);

    info!(
        source = %source.display(),
        output = %path.display(),
        degraded,
        "Record written"
    );

    Ok((path, degraded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::config::Config;
    use crate::extraction::test_support::{build_docx, build_pdf};
    use crate::llm_client::LlmError;
    use crate::pipeline::convert::{ConversionError, DocumentConverter};
    use crate::structuring::RecordStructurer;

    /// Replies with a fixed string and remembers the text it was given.
    struct CannedStructurer {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    impl CannedStructurer {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RecordStructurer for CannedStructurer {
        async fn structure(&self, text: &str, _source_path: &Path) -> Result<String, AppError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct FailingStructurer;

    #[async_trait]
    impl RecordStructurer for FailingStructurer {
        async fn structure(&self, _text: &str, _source_path: &Path) -> Result<String, AppError> {
            Err(LlmError::EmptyContent.into())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Writes a fixed PDF in place of running a real converter.
    struct FixturePdfConverter;

    impl DocumentConverter for FixturePdfConverter {
        fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ConversionError> {
            let path = convert::converted_path(source, out_dir);
            std::fs::write(&path, build_pdf(&["Converted Resume"])).unwrap();
            Ok(path)
        }

        fn name(&self) -> &str {
            "fixture"
        }
    }

    fn config() -> Config {
        Config {
            anthropic_api_key: None,
            llm_model: "test-model".to_string(),
            llm_max_tokens: 256,
            soffice_bin: "soffice".to_string(),
            inline_page_diagnostics: true,
            rust_log: "info".to_string(),
        }
    }

    fn state_with(structurer: Arc<dyn RecordStructurer>) -> AppState {
        AppState {
            config: config(),
            structurer,
            converter: None,
        }
    }

    fn options(output_dir: &Path) -> PipelineOptions {
        PipelineOptions {
            output_dir: output_dir.to_path_buf(),
            selector: PageSelector::All,
        }
    }

    const JANE: &str = "```json\n{\"status\": \"Success\", \"first_name\": \"Jane\", \"skills\": [\"Rust\"]}\n```";

    #[tokio::test]
    async fn test_pdf_flows_to_json_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("jane.pdf");
        std::fs::write(&source, build_pdf(&["Jane Doe", ""])).unwrap();

        let structurer = CannedStructurer::new(JANE);
        let state = state_with(structurer.clone());
        let report = process_document(&state, &source, &options(output.path())).await;

        let expected = output.path().join("jane.json");
        match &report.outcome {
            DocumentOutcome::Written { path, degraded } => {
                assert_eq!(path, &expected);
                assert!(!degraded);
            }
            other => panic!("expected written record, got {other:?}"),
        }
        assert_eq!(report.empty_pages, vec![1]);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&expected).unwrap()).unwrap();
        assert_eq!(value["first_name"], "Jane");
        assert_eq!(value["skills"], serde_json::json!(["Rust"]));

        let seen = structurer.seen.lock().unwrap();
        assert!(seen[0].contains("Jane Doe"));
        assert!(seen[0].contains("[WARNING]"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_written_degraded() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("bob.pdf");
        std::fs::write(&source, build_pdf(&["Bob"])).unwrap();

        let state = state_with(CannedStructurer::new("not json at all"));
        let report = process_document(&state, &source, &options(output.path())).await;

        assert!(matches!(
            report.outcome,
            DocumentOutcome::Written { degraded: true, .. }
        ));
        let value: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(output.path().join("bob.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(value, serde_json::json!({"raw_text": "not json at all"}));
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_document() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let broken = input.path().join("a_broken.pdf");
        std::fs::write(&broken, b"%PDF-1.4 truncated").unwrap();
        let legacy = input.path().join("b_legacy.doc");
        std::fs::write(&legacy, b"binary").unwrap();
        let good = input.path().join("c_good.docx");
        std::fs::write(&good, build_docx(&["Carol Smith", "carol@example.com"])).unwrap();

        let state = state_with(CannedStructurer::new(JANE));
        let documents = vec![broken, legacy, good];
        let summary = run_batch(&state, &documents, &options(output.path()))
            .await
            .unwrap();

        assert_eq!(summary.documents.len(), 3);
        assert_eq!(summary.written(), 1);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.degraded(), 0);

        match &summary.documents[1].outcome {
            DocumentOutcome::Failed { stage, code, .. } => {
                assert_eq!(*stage, DocumentStage::FormatNormalized);
                assert_eq!(*code, "UNSUPPORTED_FORMAT");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(output.path().join("c_good.json").exists());
        assert!(!output.path().join("b_legacy.json").exists());
    }

    #[tokio::test]
    async fn test_structurer_failure_stops_at_cleaned_text() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("dave.pdf");
        std::fs::write(&source, build_pdf(&["Dave"])).unwrap();

        let state = state_with(Arc::new(FailingStructurer));
        let report = process_document(&state, &source, &options(output.path())).await;

        match report.outcome {
            DocumentOutcome::Failed { stage, code, .. } => {
                assert_eq!(stage, DocumentStage::TextCleaned);
                assert_eq!(code, "LLM_ERROR");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_word_documents_go_through_converter() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let source = input.path().join("erin.doc");
        std::fs::write(&source, b"legacy binary").unwrap();

        let structurer = CannedStructurer::new(JANE);
        let mut state = state_with(structurer.clone());
        state.converter = Some(Arc::new(FixturePdfConverter));

        let report = process_document(&state, &source, &options(output.path())).await;

        assert!(matches!(report.outcome, DocumentOutcome::Written { .. }));
        assert!(output.path().join("erin.json").exists());
        assert!(structurer.seen.lock().unwrap()[0].contains("Converted Resume"));
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(DocumentStage::Discovered < DocumentStage::FormatNormalized);
        assert!(DocumentStage::RecordUnwrapped < DocumentStage::Written);
    }
}
