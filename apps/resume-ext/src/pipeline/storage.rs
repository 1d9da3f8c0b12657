//! Record persistence: one pretty-printed JSON file per source document.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::errors::AppError;
use crate::models::record::RecordOutcome;

/// `<output_dir>/<base name>.json` for a source document.
pub fn record_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{stem}.json"))
}

/// Writes the record atomically: a temporary file in the same directory is
/// filled, flushed and then renamed over `path`.
pub fn write_record(path: &Path, outcome: &RecordOutcome) -> Result<(), AppError> {
    let dir = path
        .parent()
        .ok_or_else(|| AppError::Storage(format!("no parent directory for {}", path.display())))?;

    let bytes = to_json_indent4(outcome)
        .map_err(|e| AppError::Storage(format!("failed to serialize record: {e}")))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        AppError::Storage(format!("failed to create temp file in {}: {e}", dir.display()))
    })?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| AppError::Storage(format!("failed to write {}: {e}", path.display())))?;
    tmp.persist(path)
        .map_err(|e| AppError::Storage(format!("failed to persist {}: {e}", path.display())))?;

    Ok(())
}

/// Pretty JSON with four-space indentation. Non-ASCII is written as UTF-8.
fn to_json_indent4<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
