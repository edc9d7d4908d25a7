//! Level-partitioned digest entries and the batch weekly digest.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use topicflow_shared::{DigestEntry, Priority, Result, SkillLevel, WeeklyDigest};
use topicflow_storage::{MemoryDoc, Stores};

/// Characters of each summary quoted in a weekly insight line.
const INSIGHT_PREVIEW_CHARS: usize = 100;

/// Reading advice attached to a digest entry.
pub fn guidance(level: &SkillLevel) -> &'static str {
    match level {
        SkillLevel::Novice => "Review the basics to strengthen foundational understanding.",
        SkillLevel::Intermediate => "Explore practical applications and real-world use cases.",
        SkillLevel::Advanced => "Focus on comparing system-level trade-offs and performance.",
        SkillLevel::Other(_) => "",
    }
}

pub fn priority(level: &SkillLevel) -> Priority {
    match level {
        SkillLevel::Novice => Priority::Low,
        SkillLevel::Advanced => Priority::High,
        SkillLevel::Intermediate | SkillLevel::Other(_) => Priority::Medium,
    }
}

/// Append a digest entry for `topic` under its level.
#[instrument(skip_all, fields(topic = %topic, level = %level))]
pub async fn aggregate(
    stores: &Stores,
    topic: &str,
    summary: &str,
    level: &SkillLevel,
) -> Result<DigestEntry> {
    let entry = DigestEntry {
        topic: topic.to_string(),
        summary: summary.to_string(),
        guidance: guidance(level).to_string(),
        priority: priority(level),
        timestamp: Utc::now(),
    };
    stores.append_digest(level, entry.clone()).await?;
    Ok(entry)
}

/// Build a weekly digest from every record in `memory`.
pub fn build_weekly_digest(memory: &MemoryDoc, now: DateTime<Utc>) -> WeeklyDigest {
    let mut insights = Vec::with_capacity(memory.len());
    let mut recommendations = Vec::new();

    for (topic, record) in memory {
        let preview: String = record.summary.chars().take(INSIGHT_PREVIEW_CHARS).collect();
        insights.push(format!(
            "{} ({}): {preview}...",
            title_case(topic),
            record.level
        ));
        if record.level.is_novice() {
            recommendations.push(format!(
                "Review glossary terms for '{topic}' to reinforce basics."
            ));
        }
    }

    WeeklyDigest {
        timestamp: now,
        insights,
        recommendations,
    }
}

/// Build the weekly digest from the memory store and keep it in the inbox.
#[instrument(skip_all, fields(user = stores.user().unwrap_or("-")))]
pub async fn weekly_digest(stores: &Stores) -> Result<WeeklyDigest> {
    let memory = stores.memory.load().await?;
    let digest = build_weekly_digest(&memory, Utc::now());
    stores.insert_weekly_digest(&digest).await?;
    info!(
        insights = digest.insights.len(),
        recommendations = digest.recommendations.len(),
        "weekly digest stored"
    );
    Ok(digest)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
