//! Clarity and tone-fit scoring.
//!
//! Both scores are pure functions of the summary text and skill level,
//! bounded to `[0, 100]` and rounded to one decimal.

use serde::Serialize;
use topicflow_shared::{EvaluationResult, SkillLevel};
use topicflow_storage::EvaluationDoc;

/// Summary length (characters) that earns full clarity.
pub const IDEAL_LENGTH: usize = 700;

/// Clarity points lost per character of distance from the ideal length.
const LENGTH_PENALTY: f64 = 0.05;

/// Tone fit for levels without a lexical rule.
const NEUTRAL_TONE: f64 = 70.0;

const SHORT_WORD_MAX: usize = 5;
const LONG_WORD_MIN: usize = 8;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone)]
pub struct Scorer {
    ideal_length: usize,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(IDEAL_LENGTH)
    }
}

impl Scorer {
    pub fn new(ideal_length: usize) -> Self {
        Self { ideal_length }
    }

    pub fn evaluate(&self, summary: &str, level: &SkillLevel) -> EvaluationResult {
        EvaluationResult {
            clarity_score: self.clarity(summary),
            tone_fit_score: tone_fit(summary, level),
            comment: format!("Evaluation complete for skill level: {level}."),
        }
    }

    /// `100 − 0.05 × |len − ideal|`, clamped to `[0, 100]`.
    pub fn clarity(&self, summary: &str) -> f64 {
        let len = summary.chars().count();
        let distance = len.abs_diff(self.ideal_length) as f64;
        round1((100.0 - distance * LENGTH_PENALTY).clamp(0.0, 100.0))
    }
}

/// Share of level-appropriate words, scaled to 0–100.
///
/// Novice readers want short words (≤ 5 chars), advanced readers long ones
/// (> 7 chars); every other level gets a flat neutral score.
pub fn tone_fit(summary: &str, level: &SkillLevel) -> f64 {
    let matches: fn(usize) -> bool = match level {
        SkillLevel::Novice => |len| len <= SHORT_WORD_MAX,
        SkillLevel::Advanced => |len| len >= LONG_WORD_MIN,
        _ => return NEUTRAL_TONE,
    };

    let words: Vec<usize> = summary
        .split_whitespace()
        .map(|w| w.chars().count())
        .collect();
    let hits = words.iter().filter(|len| matches(**len)).count();
    let ratio = hits as f64 / words.len().max(1) as f64;

    round1((ratio * 100.0).min(100.0))
}

/// Topics ranked by the mean of their two scores.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationReport {
    /// Best `n`, best first.
    pub top: Vec<(String, EvaluationResult)>,
    /// Worst `n`, still in descending order.
    pub low: Vec<(String, EvaluationResult)>,
}

pub fn rank_evaluations(doc: &EvaluationDoc, n: usize) -> EvaluationReport {
    let mut scored: Vec<(String, EvaluationResult)> =
        doc.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    scored.sort_by(|a, b| b.1.combined().total_cmp(&a.1.combined()));

    let top = scored.iter().take(n).cloned().collect();
    let low = scored[scored.len().saturating_sub(n)..].to_vec();
    EvaluationReport { top, low }
}
