//! Text normalization applied before the text is sent to the model.
//!
//! ASCII-only by policy: anything above code point 127 is dropped, which is
//! lossy for non-English resumes.

use once_cell::sync::Lazy;
use regex::Regex;

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static EXCESS_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n+").unwrap());

/// Cleans extracted text.
///
/// 1. drop control characters except `\n`, `\t`, `\r`
/// 2. drop characters above code point 127
/// 3. collapse runs of spaces and tabs to one space
/// 4. collapse three or more newlines (whitespace in between allowed) to one blank line
/// 5. trim every line, then the whole text
///
/// Either the full transform applies or the input comes back untouched.
pub fn normalize(text: &str) -> String {
    std::panic::catch_unwind(|| normalize_inner(text)).unwrap_or_else(|_| text.to_string())
}

fn normalize_inner(text: &str) -> String {
    let ascii: String = text
        .chars()
        .filter(|&c| (c as u32) >= 32 || matches!(c, '\n' | '\t' | '\r'))
        .filter(|&c| (c as u32) <= 127)
        .collect();

    let spaced = HORIZONTAL_SPACE.replace_all(&ascii, " ");
    let paragraphs = EXCESS_BLANK_LINES.replace_all(&spaced, "\n\n");

    paragraphs
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
