//! Page selector parsing: `"all"`, `"N"` or `"N-M"`, 1-indexed and inclusive.
//!
//! Resolution against a document is total. Inverted or out-of-range
//! selections resolve to no pages rather than an error; only text that is not
//! a selector at all fails to parse.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Invalid page range '{0}': expected 'all', 'N' or 'N-M'")]
pub struct PageRangeError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSelector {
    #[default]
    All,
    Single(i64),
    Range(i64, i64),
}

impl FromStr for PageSelector {
    type Err = PageRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PageSelector::All);
        }

        let invalid = || PageRangeError(s.to_string());
        if let Some((start, end)) = trimmed.split_once('-') {
            let start = start.trim().parse::<i64>().map_err(|_| invalid())?;
            let end = end.trim().parse::<i64>().map_err(|_| invalid())?;
            Ok(PageSelector::Range(start, end))
        } else {
            let page = trimmed.parse::<i64>().map_err(|_| invalid())?;
            Ok(PageSelector::Single(page))
        }
    }
}

impl fmt::Display for PageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelector::All => write!(f, "all"),
            PageSelector::Single(n) => write!(f, "{n}"),
            PageSelector::Range(n, m) => write!(f, "{n}-{m}"),
        }
    }
}

impl PageSelector {
    /// Resolves to 0-indexed page indices for a document of `total_pages`.
    pub fn resolve(&self, total_pages: usize) -> Vec<usize> {
        let total = total_pages as i64;
        match *self {
            PageSelector::All => (0..total_pages).collect(),
            PageSelector::Range(n, m) => {
                let start = n.saturating_sub(1).max(0);
                let end = m.min(total);
                (start..end).map(|i| i as usize).collect()
            }
            PageSelector::Single(n) => {
                let page = n.saturating_sub(1);
                if (0..total).contains(&page) {
                    vec![page as usize]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// The "Pages Read" line shown in the document header, or `None` when a
    /// single-page selector falls outside the document.
    pub fn describe(&self, total_pages: usize) -> Option<String> {
        let total = total_pages as i64;
        match *self {
            PageSelector::All => Some(format!("all (1-{total_pages})")),
            PageSelector::Range(n, m) => {
                let start = n.saturating_sub(1).max(0);
                let end = m.min(total);
                Some(format!("{self} (0-indexed: {start}-{})", end.saturating_sub(1)))
            }
            PageSelector::Single(n) => {
                let page = n.saturating_sub(1);
                (0..total)
                    .contains(&page)
                    .then(|| format!("{self} (0-indexed: {page})"))
            }
        }
    }
}
