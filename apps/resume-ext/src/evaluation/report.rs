use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

const COLUMNS: [&str; 7] = [
    "resume",
    "first_name_acc",
    "last_name_acc",
    "email_acc",
    "skills_precision",
    "skills_recall",
    "skills_f1",
];

/// Scores for one document present in both the produced and golden sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRow {
    pub resume: String,
    pub first_name_acc: u8,
    pub last_name_acc: u8,
    pub email_acc: u8,
    pub skills_precision: f64,
    pub skills_recall: f64,
    pub skills_f1: f64,
}

impl EvaluationRow {
    fn cells(&self) -> [String; 7] {
        [
            self.resume.clone(),
            self.first_name_acc.to_string(),
            self.last_name_acc.to_string(),
            self.email_acc.to_string(),
            format_ratio(self.skills_precision),
            format_ratio(self.skills_recall),
            format_ratio(self.skills_f1),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    pub rows: Vec<EvaluationRow>,
}

impl EvaluationReport {
    /// Arithmetic mean of the skills F1 column; `None` when there are no rows.
    pub fn mean_skills_f1(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: f64 = self.rows.iter().map(|r| r.skills_f1).sum();
        Some(total / self.rows.len() as f64)
    }

    pub fn to_csv(&self) -> String {
        let mut out = COLUMNS.join(",");
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.cells().iter().map(|c| escape_csv_cell(c)).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    /// Overwrites `path` with the CSV form of the report.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_csv())
            .with_context(|| format!("failed to write evaluation report: {}", path.display()))
    }

    /// Fixed-width table for the terminal, followed by the mean skills F1.
    pub fn render_table(&self) -> String {
        let body: Vec<[String; 7]> = self.rows.iter().map(EvaluationRow::cells).collect();

        let mut widths = COLUMNS.map(str::len);
        for cells in &body {
            for (width, cell) in widths.iter_mut().zip(cells.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, &width))| {
                    if i == 0 {
                        format!("{cell:<width$}")
                    } else {
                        format!("{cell:>width$}")
                    }
                })
                .collect::<Vec<_>>()
                .join("  ")
        };

        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut out = String::from("Evaluation Results:\n");
        out.push_str(&line(&header[..]));
        out.push('\n');
        for cells in &body {
            out.push_str(&line(&cells[..]));
            out.push('\n');
        }

        let mean = self
            .mean_skills_f1()
            .map(format_ratio)
            .unwrap_or_else(|| "n/a".to_string());
        out.push_str(&format!("\nOverall F1 (skills): {mean}\n"));
        out
    }
}

/// Whole numbers keep one decimal so ratio columns read uniformly.
fn format_ratio(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn escape_csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
