//! Core domain types for Topicflow documents.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SkillLevel
// ---------------------------------------------------------------------------

/// Reader skill level controlling tone, scoring and routing branches.
///
/// Unrecognized values are kept verbatim in [`SkillLevel::Other`] so they
/// survive a round trip through the stores; level-dependent logic treats them
/// as the neutral branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SkillLevel {
    #[default]
    Novice,
    Intermediate,
    Advanced,
    Other(String),
}

impl SkillLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Novice => "novice",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Other(s) => s,
        }
    }

    pub fn is_novice(&self) -> bool {
        matches!(self, Self::Novice)
    }
}

impl From<&str> for SkillLevel {
    fn from(s: &str) -> Self {
        match s {
            "novice" => Self::Novice,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for SkillLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "novice" | "intermediate" | "advanced" => Self::from(s.as_str()),
            _ => Self::Other(s),
        }
    }
}

impl From<SkillLevel> for String {
    fn from(level: SkillLevel) -> Self {
        match level {
            SkillLevel::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

// ---------------------------------------------------------------------------
// Source / Priority
// ---------------------------------------------------------------------------

/// Which acquisition capability produced a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Primary,
    Fallback,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
            Self::Unknown => "unknown",
        })
    }
}

/// Advisory priority attached to a digest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Placeholder for log entries written before run ids existed.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Memory / evaluation documents
// ---------------------------------------------------------------------------

/// A skill-tailored summary for one topic, as kept in the memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub topic: String,
    pub level: SkillLevel,
    pub summary: String,
    /// Extracted only for novice readers; empty otherwise.
    #[serde(default, alias = "glossary")]
    pub glossary_terms: Vec<String>,
    #[serde(default)]
    pub source: Source,
    pub timestamp: DateTime<Utc>,
}

/// Scores computed for a summary. Stored per topic, overwritten each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub clarity_score: f64,
    pub tone_fit_score: f64,
    pub comment: String,
}

impl EvaluationResult {
    /// Mean of clarity and tone fit, used for ranking.
    pub fn combined(&self) -> f64 {
        (self.clarity_score + self.tone_fit_score) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Append-log entries
// ---------------------------------------------------------------------------

/// One dated entry in a section's append log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub topic: String,
    pub summary: String,
    pub level: SkillLevel,
    pub timestamp: DateTime<Utc>,
}

/// One per-topic entry in the level-partitioned digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub topic: String,
    pub summary: String,
    pub guidance: String,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
}

/// Batch digest built from the whole memory store at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDigest {
    pub timestamp: DateTime<Utc>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Audit record appended once per processed topic per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunLogEntry {
    #[serde(default = "RunId::nil")]
    pub run_id: RunId,
    pub topic: String,
    pub level: SkillLevel,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: Source,
    pub clarity_score: f64,
    pub tone_score: f64,
}

/// Input topic list (`autonomous_topics.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicList {
    #[serde(default)]
    pub topics: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_level_known_values() {
        assert_eq!(SkillLevel::from("novice"), SkillLevel::Novice);
        assert_eq!(SkillLevel::from("advanced"), SkillLevel::Advanced);
        assert_eq!(SkillLevel::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn skill_level_preserves_unrecognized() {
        let level = SkillLevel::from("Expert");
        assert_eq!(level, SkillLevel::Other("Expert".into()));

        let json = serde_json::to_string(&level).expect("serialize");
        assert_eq!(json, "\"Expert\"");
        let parsed: SkillLevel = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, level);
    }

    #[test]
    fn source_defaults_to_unknown() {
        let parsed: Source = serde_json::from_str("\"wikipedia\"").expect("deserialize");
        assert_eq!(parsed, Source::Unknown);
        assert_eq!(Source::default(), Source::Unknown);
        assert_eq!(serde_json::to_string(&Source::Fallback).unwrap(), "\"fallback\"");
    }

    #[test]
    fn summary_record_accepts_glossary_alias() {
        let json = r#"{
            "topic": "fuel injection",
            "level": "novice",
            "summary": "A summary.",
            "glossary": ["Diesel"],
            "timestamp": "2026-01-05T10:00:00Z"
        }"#;
        let record: SummaryRecord = serde_json::from_str(json).expect("deserialize");
        assert_eq!(record.glossary_terms, vec!["Diesel".to_string()]);
        assert_eq!(record.source, Source::Unknown);
    }

    #[test]
    fn run_log_entry_without_run_id() {
        let json = r#"{
            "topic": "combustion",
            "level": "novice",
            "timestamp": "2026-01-05T10:00:00Z",
            "source": "primary",
            "clarity_score": 65.0,
            "tone_score": 40.5
        }"#;
        let entry: RunLogEntry = serde_json::from_str(json).expect("deserialize");
        assert_eq!(entry.run_id, RunId::nil());
        assert_eq!(entry.source, Source::Primary);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
    }

    #[test]
    fn evaluation_combined_is_mean() {
        let eval = EvaluationResult {
            clarity_score: 80.0,
            tone_fit_score: 60.0,
            comment: String::new(),
        };
        assert_eq!(eval.combined(), 70.0);
    }
}
