//! Keyword routing of topics into named output sections.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, instrument};

use topicflow_shared::{Result, SectionEntry, SkillLevel};
use topicflow_storage::Stores;

/// Section used when nothing else matches.
pub const DEFAULT_SECTION: &str = "general_insights";

/// Section every novice summary lands in.
pub const NOVICE_SECTION: &str = "basic_concepts";

/// Section → keywords, matched as substrings of the lower-cased topic.
pub const ROUTING_TABLE: &[(&str, &[&str])] = &[
    (
        "mechanical_systems",
        &["fuel", "engine", "piston", "combustion", "transmission", "ignition"],
    ),
    (
        "electrical_systems",
        &["sensor", "electric", "voltage", "circuit", "controller"],
    ),
    (
        "diagnostics",
        &["fault", "error", "obd", "diagnose", "malfunction"],
    ),
    (
        "learning_guides",
        &["introduction", "basics", "overview", "fundamentals"],
    ),
    (
        "advanced_topics",
        &["combustion", "optimization", "efficiency", "dynamics", "calibration"],
    ),
    (NOVICE_SECTION, &["beginner"]),
];

/// Every section `topic` belongs to. Never empty.
pub fn route(topic: &str, level: &SkillLevel) -> BTreeSet<&'static str> {
    let topic = topic.to_lowercase();

    let mut sections: BTreeSet<&'static str> = ROUTING_TABLE
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| topic.contains(kw)))
        .map(|(section, _)| *section)
        .collect();

    if level.is_novice() {
        sections.insert(NOVICE_SECTION);
    }
    if sections.is_empty() {
        sections.insert(DEFAULT_SECTION);
    }
    sections
}

/// Route `topic` and append one entry to each of its sections.
#[instrument(skip_all, fields(topic = %topic, level = %level))]
pub async fn distribute(
    stores: &Stores,
    topic: &str,
    summary: &str,
    level: &SkillLevel,
) -> Result<BTreeSet<&'static str>> {
    let sections = route(topic, level);
    let entry = SectionEntry {
        topic: topic.to_string(),
        summary: summary.to_string(),
        level: level.clone(),
        timestamp: Utc::now(),
    };

    stores
        .append_to_sections(sections.iter().copied(), &entry)
        .await?;
    debug!(?sections, "distributed to sections");
    Ok(sections)
}
