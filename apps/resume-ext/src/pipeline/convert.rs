//! Format normalization: word-processor documents to PDF via an external
//! converter, so a single page-aware extractor handles every resume.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Converter '{program}' could not be started: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {status} for {path}: {stderr}")]
    Failed {
        path: String,
        status: String,
        stderr: String,
    },

    #[error("Converter produced no PDF for {0}")]
    MissingOutput(String),
}

/// Converts a DOCX/DOC file into a PDF placed in `out_dir`.
///
/// Blocking; callers run it on the blocking pool.
pub trait DocumentConverter: Send + Sync {
    fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ConversionError>;

    fn name(&self) -> &str;
}

/// LibreOffice in headless mode.
pub struct SofficeConverter {
    program: String,
}

impl SofficeConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Whether the binary can be executed at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("--version").output().is_ok()
    }
}

impl DocumentConverter for SofficeConverter {
    fn convert_to_pdf(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, ConversionError> {
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(source)
            .output()
            .map_err(|source| ConversionError::Unavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::Failed {
                path: source.display().to_string(),
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let expected = converted_path(source, out_dir);
        if !expected.exists() {
            return Err(ConversionError::MissingOutput(source.display().to_string()));
        }

        Ok(expected)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// `<out_dir>/<stem>.pdf`, the name soffice gives its output.
pub fn converted_path(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}.pdf"))
}
