//! Text extraction: turns a PDF or DOCX resume into plain text.
//!
//! Flow: `extract_document` → format dispatch (`pdf` / `docx`) →
//!       `ExtractedDocument` → `render` → `normalize::normalize`.
//!
//! Failures are returned as `ExtractionError` values for the one document;
//! empty pages are not failures and carry a diagnostic instead.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub mod docx;
pub mod normalize;
pub mod page_range;
pub mod pdf;

#[cfg(test)]
pub(crate) mod test_support;

pub use page_range::PageSelector;

/// Characters shown in the per-page text preview.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("File not found at {0}")]
    NotFound(String),

    #[error("Unsupported file type for {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {0}")]
    Decode(String),

    #[error("No text extracted from {0}")]
    Empty(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy binary word-processor format; only readable after conversion.
    Doc,
}

impl DocumentFormat {
    /// Detects the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "doc" => Some(DocumentFormat::Doc),
            _ => None,
        }
    }

    pub fn is_word_processor(self) -> bool {
        matches!(self, DocumentFormat::Docx | DocumentFormat::Doc)
    }
}

/// Text of one selected page. `page_index` is 0-based.
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub page_index: usize,
    pub text: String,
    pub extracted: bool,
    /// Empty when the page yielded text.
    pub diagnostics: String,
}

/// Result of extracting one document. Built once by the extractor and only
/// read afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub source_path: PathBuf,
    pub format: DocumentFormat,
    pub total_pages: usize,
    pub selector: PageSelector,
    /// Non-empty entries of the PDF information dictionary, keys as `/Title`.
    pub info: Vec<(String, String)>,
    pub pages: Vec<PageText>,
}

impl ExtractedDocument {
    /// Page indices that produced no text.
    pub fn empty_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| !p.extracted)
            .map(|p| p.page_index)
            .collect()
    }

    /// Renders the text handed to the rest of the pipeline.
    ///
    /// PDF output starts with a metadata header, then each page with a short
    /// preview (or its diagnostics), its text and a page-break marker. DOCX
    /// has no page structure and renders as its text alone.
    pub fn render(&self, inline_diagnostics: bool) -> String {
        if self.format != DocumentFormat::Pdf {
            return self
                .pages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
        }

        let file_name = self
            .source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut out = format!("PDF: {file_name}\nTotal Pages: {}\n", self.total_pages);
        if let Some(pages_read) = self.selector.describe(self.total_pages) {
            out.push_str(&format!("Pages Read: {pages_read}\n"));
        }
        if !self.info.is_empty() {
            out.push_str("\nDocument Information:\n");
            for (key, value) in &self.info {
                out.push_str(&format!("- {key}: {value}\n"));
            }
        }
        out.push_str("\n--- Content Start ---\n\n");

        for page in &self.pages {
            out.push_str(&format!("--- Page {} ---\n", page.page_index + 1));
            if page.extracted {
                out.push_str(&format!("Text preview: {}\n", preview(&page.text)));
                out.push_str(&format!(
                    "Text length: {} characters\n",
                    page.text.chars().count()
                ));
            } else if inline_diagnostics && !page.diagnostics.is_empty() {
                out.push_str(&page.diagnostics);
                if !page.diagnostics.ends_with('\n') {
                    out.push('\n');
                }
            }
            out.push('\n');
            if !page.text.is_empty() {
                out.push_str(&page.text);
                out.push('\n');
            }
            out.push_str("\n--- Page Break ---\n\n");
        }

        out
    }
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    let mut preview = head.replace('\n', " ").trim().to_string();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Extracts text from the document at `path`.
///
/// The selector applies to PDFs only; DOCX paragraphs and tables are read in
/// full.
pub fn extract_document(
    path: &Path,
    selector: PageSelector,
) -> Result<ExtractedDocument, ExtractionError> {
    if !path.is_file() {
        return Err(ExtractionError::NotFound(path.display().to_string()));
    }

    match DocumentFormat::from_path(path) {
        Some(DocumentFormat::Pdf) => pdf::extract_pdf(path, selector),
        Some(DocumentFormat::Docx) => docx::extract_docx(path),
        Some(DocumentFormat::Doc) => Err(ExtractionError::UnsupportedFormat(format!(
            "{} (legacy .doc must be converted to PDF first)",
            path.display()
        ))),
        None => Err(ExtractionError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}
