//! DOCX text extraction using docx-rs.
//!
//! Non-empty paragraphs come first in document order, followed by one line per
//! table row with the non-empty cells joined by ` | `.

use std::path::Path;

use docx_rs::{DocumentChild, ParagraphChild, RunChild, TableCellContent, TableChild, TableRowChild};

use super::{DocumentFormat, ExtractedDocument, ExtractionError, PageSelector, PageText};

const CELL_SEPARATOR: &str = " | ";

pub fn extract_docx(path: &Path) -> Result<ExtractedDocument, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let text = extract_text(&bytes)
        .map_err(|e| ExtractionError::Decode(format!("{}: {e}", path.display())))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty(path.display().to_string()));
    }

    Ok(ExtractedDocument {
        source_path: path.to_path_buf(),
        format: DocumentFormat::Docx,
        total_pages: 1,
        selector: PageSelector::All,
        info: Vec::new(),
        pages: vec![PageText {
            page_index: 0,
            text,
            extracted: true,
            diagnostics: String::new(),
        }],
    })
}

fn extract_text(bytes: &[u8]) -> Result<String, docx_rs::ReaderError> {
    let docx = docx_rs::read_docx(bytes)?;

    let mut paragraphs: Vec<String> = Vec::new();
    let mut rows: Vec<String> = Vec::new();

    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                let text = text.trim();
                if !text.is_empty() {
                    paragraphs.push(text.to_string());
                }
            }
            DocumentChild::Table(t) => rows.extend(table_rows(t)),
            _ => {}
        }
    }

    paragraphs.extend(rows);
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();

    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(r, &mut text),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run_text(r, &mut text);
                    }
                }
            }
            _ => {}
        }
    }

    text
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn table_rows(t: &docx_rs::Table) -> Vec<String> {
    let mut lines = Vec::new();

    for row in &t.rows {
        let TableChild::TableRow(r) = row;
        let cells: Vec<String> = r
            .cells
            .iter()
            .map(|cell| {
                let TableRowChild::TableCell(c) = cell;
                c.children
                    .iter()
                    .filter_map(|child| match child {
                        TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                        _ => None,
                    })
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .filter(|cell| !cell.is_empty())
            .collect();

        if !cells.is_empty() {
            lines.push(cells.join(CELL_SEPARATOR));
        }
    }

    lines
}
