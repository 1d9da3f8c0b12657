use std::collections::HashSet;

use serde::Serialize;

/// 1 when both values match after trimming and case-folding, else 0.
/// Exact by intent: near misses score 0.
pub fn score_field(pred: &str, truth: &str) -> u8 {
    u8::from(pred.trim().to_lowercase() == truth.trim().to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkillScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Set-based precision, recall and F1 over case-folded skills.
///
/// Duplicates collapse before counting. Every ratio with a zero
/// denominator is 0.
pub fn score_skills(pred: &[String], truth: &[String]) -> SkillScore {
    let pred: HashSet<String> = pred.iter().map(|s| s.to_lowercase()).collect();
    let truth: HashSet<String> = truth.iter().map(|s| s.to_lowercase()).collect();
    let hits = pred.intersection(&truth).count() as f64;

    let precision = if pred.is_empty() {
        0.0
    } else {
        hits / pred.len() as f64
    };
    let recall = if truth.is_empty() {
        0.0
    } else {
        hits / truth.len() as f64
    };
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    SkillScore {
        precision,
        recall,
        f1,
    }
}
