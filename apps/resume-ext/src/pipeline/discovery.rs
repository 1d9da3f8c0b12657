use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::extraction::DocumentFormat;

/// Lists the resumes directly inside `input_dir` (no recursion), sorted by
/// path so batch order is stable across runs.
pub fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        if DocumentFormat::from_path(&path).is_some() {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}
