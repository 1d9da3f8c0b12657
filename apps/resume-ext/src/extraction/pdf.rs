//! PDF text extraction.
//!
//! Pages are read one at a time through lopdf so that a page selector can be
//! honoured and empty pages can be diagnosed individually. When lopdf cannot
//! load the file at all, pdf-extract is tried on the same bytes; its output
//! has no page boundaries and is treated as a single page.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use super::{DocumentFormat, ExtractedDocument, ExtractionError, PageSelector, PageText};

pub fn extract_pdf(
    path: &Path,
    selector: PageSelector,
) -> Result<ExtractedDocument, ExtractionError> {
    let bytes = std::fs::read(path)?;

    match Document::load_mem(&bytes) {
        Ok(doc) => Ok(extract_pages(&doc, path, selector)),
        Err(load_err) => {
            warn!(
                "lopdf could not load {}: {load_err}; falling back to pdf-extract",
                path.display()
            );
            extract_without_pages(&bytes, path, selector, &load_err.to_string())
        }
    }
}

fn extract_pages(doc: &Document, path: &Path, selector: PageSelector) -> ExtractedDocument {
    let page_ids: Vec<(u32, ObjectId)> = doc.get_pages().into_iter().collect();
    let total_pages = page_ids.len();

    let pages = selector
        .resolve(total_pages)
        .into_iter()
        .map(|index| {
            let (page_number, page_id) = page_ids[index];
            match doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => PageText {
                    page_index: index,
                    text,
                    extracted: true,
                    diagnostics: String::new(),
                },
                Ok(text) => PageText {
                    page_index: index,
                    text,
                    extracted: false,
                    diagnostics: empty_page_diagnostics(doc, page_id, index, None),
                },
                Err(e) => {
                    debug!("page {} of {}: {e}", index + 1, path.display());
                    PageText {
                        page_index: index,
                        text: String::new(),
                        extracted: false,
                        diagnostics: empty_page_diagnostics(
                            doc,
                            page_id,
                            index,
                            Some(&e.to_string()),
                        ),
                    }
                }
            }
        })
        .collect();

    ExtractedDocument {
        source_path: path.to_path_buf(),
        format: DocumentFormat::Pdf,
        total_pages,
        selector,
        info: document_info(doc),
        pages,
    }
}

fn extract_without_pages(
    bytes: &[u8],
    path: &Path,
    selector: PageSelector,
    load_err: &str,
) -> Result<ExtractedDocument, ExtractionError> {
    // pdf-extract panics on some malformed inputs.
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| {
            ExtractionError::Decode(format!(
                "{}: {load_err}; fallback extraction panicked",
                path.display()
            ))
        })?
        .map_err(|e| {
            ExtractionError::Decode(format!(
                "{}: {load_err}; fallback extraction failed: {e}",
                path.display()
            ))
        })?;

    let extracted = !text.trim().is_empty();
    let mut diagnostics = format!(
        "[WARNING] Page structure unavailable ({load_err}). Text was recovered without page boundaries."
    );
    if !extracted {
        diagnostics.push_str(
            "\n[WARNING] No text extracted. This could be an image-based document or content protection.",
        );
    }

    let pages = selector
        .resolve(1)
        .into_iter()
        .map(|index| PageText {
            page_index: index,
            text: text.clone(),
            extracted,
            diagnostics: diagnostics.clone(),
        })
        .collect();

    Ok(ExtractedDocument {
        source_path: path.to_path_buf(),
        format: DocumentFormat::Pdf,
        total_pages: 1,
        selector,
        info: Vec::new(),
        pages,
    })
}

/// Explains why a page produced no text: the page may be a scanned image or
/// protected. Object counts are included to tell those cases apart.
fn empty_page_diagnostics(
    doc: &Document,
    page_id: ObjectId,
    index: usize,
    error: Option<&str>,
) -> String {
    let page_number = index + 1;
    let mut lines = vec![format!(
        "[WARNING] No text extracted from page {page_number}. This could be an image-based page or content protection."
    )];
    if let Some(error) = error {
        lines.push(format!("Extraction error: {error}"));
    }

    let Ok(page) = doc.get_dictionary(page_id) else {
        return lines.join("\n");
    };

    let content_streams = match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.len(),
        Ok(_) => 1,
        Err(_) => 0,
    };
    lines.push(format!("Page objects: {content_streams} content streams"));

    if let Some(resources) = page.get(b"Resources").ok().and_then(|o| as_dict(doc, o)) {
        let keys: Vec<String> = resources
            .iter()
            .map(|(k, _)| format!("/{}", String::from_utf8_lossy(k)))
            .collect();
        if !keys.is_empty() {
            lines.push(format!("Resources: {}", keys.join(", ")));
        }
        if let Some(xobjects) = resources.get(b"XObject").ok().and_then(|o| as_dict(doc, o)) {
            lines.push(format!(
                "Contains XObjects (possibly images): {}",
                xobjects.len()
            ));
        }
    }

    lines.join("\n")
}

fn as_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

/// Non-empty text entries of the trailer's Info dictionary.
fn document_info(doc: &Document) -> Vec<(String, String)> {
    let Some(info) = doc.trailer.get(b"Info").ok().and_then(|o| as_dict(doc, o)) else {
        return Vec::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Object::String(bytes, _) => decode_pdf_string(bytes),
                Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
                _ => return None,
            };
            let value = value.trim().to_string();
            if value.is_empty() {
                None
            } else {
                Some((format!("/{}", String::from_utf8_lossy(key)), value))
            }
        })
        .collect()
}

/// PDF text strings are either UTF-16BE with a byte-order mark or a
/// single-byte encoding; the latter is read as Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
