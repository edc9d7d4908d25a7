//! Skill-level framing around a summary.

use topicflow_shared::SkillLevel;

/// Frame `summary` for the reader's level. Unrecognized levels get the text as-is.
pub fn apply_skill_level_tone(summary: &str, level: &SkillLevel) -> String {
    match level {
        SkillLevel::Novice => format!(
            "Imagine you're new to the topic. Here's a simple explanation:\n\n\
             {summary}\n\n\
             Try thinking of it like a simplified version of a complex machine."
        ),
        SkillLevel::Intermediate => format!(
            "Here's a moderately detailed explanation:\n\n\
             {summary}\n\n\
             This version assumes you have some background knowledge."
        ),
        SkillLevel::Advanced => format!(
            "Technical summary:\n\n\
             {summary}\n\n\
             This version uses domain-specific terminology intentionally."
        ),
        SkillLevel::Other(_) => summary.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novice_framing() {
        let out = apply_skill_level_tone("Fuel burns.", &SkillLevel::Novice);
        assert!(out.starts_with("Imagine you're new to the topic."));
        assert!(out.contains("\n\nFuel burns.\n\n"));
    }

    #[test]
    fn intermediate_framing() {
        let out = apply_skill_level_tone("Fuel burns.", &SkillLevel::Intermediate);
        assert!(out.ends_with("This version assumes you have some background knowledge."));
    }

    #[test]
    fn unknown_level_passthrough() {
        let level = SkillLevel::Other("expert".into());
        assert_eq!(apply_skill_level_tone("Fuel burns.", &level), "Fuel burns.");
    }
}
