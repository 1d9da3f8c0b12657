//! Evaluation harness: scores produced records against golden records.
//!
//! Documents are joined on file stem (case-sensitive). A record on only one
//! side, or whose golden record is an empty object, is left out of the
//! report without comment; a file that cannot be read or parsed is skipped
//! with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub mod fields;
pub mod report;
pub mod scoring;

use fields::{skills_field, text_field, EMAIL, FIRST_NAME, LAST_NAME};
use report::{EvaluationReport, EvaluationRow};
use scoring::{score_field, score_skills};

type Record = Map<String, Value>;

/// Loads every golden record, then scores each produced record that has a
/// golden counterpart. Rows follow produced file name order.
pub fn evaluate_dirs(produced_dir: &Path, golden_dir: &Path) -> Result<EvaluationReport> {
    let golden: HashMap<String, Record> = json_files(golden_dir)?
        .into_iter()
        .filter_map(|(name, path)| load_record(&path).map(|record| (name, record)))
        .collect();
    info!(golden = golden.len(), dir = %golden_dir.display(), "Golden records loaded");

    let mut rows = Vec::new();
    for (name, path) in json_files(produced_dir)? {
        let Some(truth) = golden.get(&name) else {
            debug!(resume = %name, "No golden record; not scored");
            continue;
        };
        if truth.is_empty() {
            debug!(resume = %name, "Golden record is empty; not scored");
            continue;
        }
        let Some(pred) = load_record(&path) else {
            continue;
        };
        rows.push(score_record(&name, &pred, truth));
    }

    info!(scored = rows.len(), "Evaluation complete");
    Ok(EvaluationReport { rows })
}

/// Scores one produced record against its golden record.
pub fn score_record(name: &str, pred: &Record, truth: &Record) -> EvaluationRow {
    let skills = score_skills(&skills_field(pred), &skills_field(truth));

    EvaluationRow {
        resume: name.to_string(),
        first_name_acc: score_field(&text_field(pred, FIRST_NAME), &text_field(truth, FIRST_NAME)),
        last_name_acc: score_field(&text_field(pred, LAST_NAME), &text_field(truth, LAST_NAME)),
        email_acc: score_field(&text_field(pred, EMAIL), &text_field(truth, EMAIL)),
        skills_precision: skills.precision,
        skills_recall: skills.recall,
        skills_f1: skills.f1,
    }
}

/// `(stem, path)` for every `*.json` file directly in `dir`, sorted by stem.
fn json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path));
        }
    }

    files.sort();
    Ok(files)
}

fn load_record(path: &Path) -> Option<Record> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "Skipping unreadable record: {e}");
            return None;
        }
    };

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(path = %path.display(), "Skipping record that is not a JSON object");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), "Skipping malformed record: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
    }

    #[test]
    fn test_inner_join_on_stem() {
        let produced = tempfile::tempdir().unwrap();
        let golden = tempfile::tempdir().unwrap();
        let alice = json!({"first_name": "Alice", "skills": ["Rust"]});
        write(produced.path(), "alice.json", &alice);
        write(produced.path(), "bob.json", &json!({"first_name": "Bob"}));
        write(golden.path(), "alice.json", &alice);
        write(golden.path(), "carol.json", &json!({"first_name": "Carol"}));

        let report = evaluate_dirs(produced.path(), golden.path()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].resume, "alice");
        assert_eq!(report.rows[0].skills_f1, 1.0);
    }

    #[test]
    fn test_join_is_case_sensitive() {
        let produced = tempfile::tempdir().unwrap();
        let golden = tempfile::tempdir().unwrap();
        write(produced.path(), "Alice.json", &json!({}));
        write(golden.path(), "alice.json", &json!({}));

        let report = evaluate_dirs(produced.path(), golden.path()).unwrap();
        assert!(report.rows.is_empty());
        assert_eq!(report.mean_skills_f1(), None);
    }

    #[test]
    fn test_empty_golden_record_is_not_scored() {
        let produced = tempfile::tempdir().unwrap();
        let golden = tempfile::tempdir().unwrap();
        write(produced.path(), "alice.json", &json!({}));
        write(produced.path(), "bob.json", &json!({"first_name": "Bob"}));
        write(golden.path(), "alice.json", &json!({}));
        write(golden.path(), "bob.json", &json!({"first_name": "Bob"}));

        let report = evaluate_dirs(produced.path(), golden.path()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].resume, "bob");
    }

    #[test]
    fn test_row_scores_with_mixed_spellings() {
        let pred = json!({
            "first_name": " Jane ",
            "last_name": "Smith",
            "email": "JANE@example.com",
            "skills": ["Python", "SQL"]
        });
        let truth = json!({
            "First_Name": "jane",
            "Last_Name": "Doe",
            "Email_Address": "jane@example.com",
            "Skills": ["python", "Java"]
        });
        let row = score_record(
            "jane",
            pred.as_object().unwrap(),
            truth.as_object().unwrap(),
        );

        assert_eq!(row.first_name_acc, 1);
        assert_eq!(row.last_name_acc, 0);
        assert_eq!(row.email_acc, 1);
        assert_eq!(row.skills_precision, 0.5);
        assert_eq!(row.skills_recall, 0.5);
        assert_eq!(row.skills_f1, 0.5);
    }

    #[test]
    fn test_degraded_record_scores_zero() {
        let pred = json!({"raw_text": "not json at all"});
        let truth = json!({"first_name": "Jane", "skills": ["Rust"]});
        let row = score_record("jane", pred.as_object().unwrap(), truth.as_object().unwrap());
        assert_eq!(row.first_name_acc, 0);
        assert_eq!(row.skills_f1, 0.0);
    }

    #[test]
    fn test_malformed_files_are_skipped() {
        let produced = tempfile::tempdir().unwrap();
        let golden = tempfile::tempdir().unwrap();
        fs::write(produced.path().join("alice.json"), "{ broken").unwrap();
        write(produced.path(), "bob.json", &json!({"first_name": "Bob"}));
        write(golden.path(), "alice.json", &json!({"first_name": "Alice"}));
        write(golden.path(), "bob.json", &json!({"first_name": "Bob"}));
        fs::write(golden.path().join("list.json"), "[1, 2]").unwrap();

        let report = evaluate_dirs(produced.path(), golden.path()).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].resume, "bob");
        assert_eq!(report.rows[0].first_name_acc, 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let golden = tempfile::tempdir().unwrap();
        assert!(evaluate_dirs(Path::new("/nonexistent/produced"), golden.path()).is_err());
    }
}
