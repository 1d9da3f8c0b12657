use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::pipeline::convert::ConversionError;

/// Application-level error type.
/// Every per-document failure in the batch is carried as one of these so the
/// pipeline can record it and move on to the next document.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code, used in the batch summary.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Extraction(e) => match e {
                ExtractionError::NotFound(_) => "NOT_FOUND",
                ExtractionError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
                ExtractionError::Decode(_) => "DECODE_ERROR",
                ExtractionError::Empty(_) => "EMPTY_DOCUMENT",
                ExtractionError::Io(_) => "IO_ERROR",
            },
            AppError::Conversion(_) => "CONVERSION_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
