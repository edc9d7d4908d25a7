//! Summary acquisition: primary source first, fallback second.
//!
//! The acquirer only decides *which* source's output to keep. Tone
//! adjustment happens inside the sources; glossary extraction happens here,
//! on the un-toned text, and only for novice readers.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::Utc;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use topicflow_fetch::{EncyclopediaSource, FetchedSummary, SummarySource, WebSearchSource};
use topicflow_shared::{AppConfig, Result, SkillLevel, Source, SummaryRecord, TopicflowError};

/// Default number of glossary terms kept.
pub const DEFAULT_GLOSSARY_CAP: usize = 3;

/// A summary is usable when it has text and is not a "no summary" sentinel.
pub fn is_usable(summary: &str) -> bool {
    !summary.trim().is_empty() && !summary.to_lowercase().contains("no summary")
}

/// Capitalized words of four or more letters, deduplicated in first-seen
/// order, at most `cap` of them.
pub fn extract_glossary_terms(text: &str, cap: usize) -> Vec<String> {
    static TERM_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b[A-Z][a-zA-Z\-]{3,}\b").expect("valid regex"));

    let mut seen = HashSet::new();
    TERM_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|term| seen.insert(*term))
        .take(cap)
        .map(str::to_string)
        .collect()
}

/// Two-source acquisition with a per-call timeout.
pub struct SourceAcquirer {
    primary: Arc<dyn SummarySource>,
    fallback: Arc<dyn SummarySource>,
    timeout: Duration,
    glossary_cap: usize,
}

impl SourceAcquirer {
    pub fn new(
        primary: Arc<dyn SummarySource>,
        fallback: Arc<dyn SummarySource>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            fallback,
            timeout,
            glossary_cap: DEFAULT_GLOSSARY_CAP,
        }
    }

    pub fn with_glossary_cap(mut self, cap: usize) -> Self {
        self.glossary_cap = cap;
        self
    }

    /// Build the HTTP-backed acquirer described by `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let primary = Arc::new(EncyclopediaSource::new(&config.sources)?);
        let fallback = Arc::new(WebSearchSource::new(&config.sources)?);
        Ok(Self::new(
            primary,
            fallback,
            Duration::from_secs(config.sources.timeout_secs),
        )
        .with_glossary_cap(config.pipeline.glossary_cap))
    }

    /// Obtain a summary record for `topic`.
    ///
    /// Fails with [`TopicflowError::Acquisition`] only when neither source
    /// produced content; transport errors and timeouts just move on to the
    /// next source.
    #[instrument(skip_all, fields(topic = %topic, level = %level))]
    pub async fn acquire(&self, topic: &str, level: &SkillLevel) -> Result<SummaryRecord> {
        let (fetched, source) = match self.attempt(self.primary.as_ref(), topic, level).await {
            Some(fetched) if is_usable(&fetched.summary) => (fetched, Source::Primary),
            _ => {
                info!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "primary summary unusable, trying fallback"
                );
                match self.attempt(self.fallback.as_ref(), topic, level).await {
                    Some(fetched) if !fetched.summary.trim().is_empty() => {
                        (fetched, Source::Fallback)
                    }
                    _ => {
                        return Err(TopicflowError::acquisition(
                            topic,
                            "no content from primary or fallback source",
                        ));
                    }
                }
            }
        };

        let glossary_terms = if level.is_novice() {
            extract_glossary_terms(&fetched.raw_text, self.glossary_cap)
        } else {
            Vec::new()
        };

        debug!(%source, glossary = glossary_terms.len(), "summary acquired");

        Ok(SummaryRecord {
            topic: topic.to_string(),
            level: level.clone(),
            summary: fetched.summary,
            glossary_terms,
            source,
            timestamp: Utc::now(),
        })
    }

    /// One bounded call. `None` on transport failure or timeout.
    async fn attempt(
        &self,
        source: &dyn SummarySource,
        topic: &str,
        level: &SkillLevel,
    ) -> Option<FetchedSummary> {
        match tokio::time::timeout(self.timeout, source.fetch(topic, level)).await {
            Ok(Ok(fetched)) => Some(fetched),
            Ok(Err(e)) => {
                warn!(source = source.name(), error = %e, "summary source failed");
                None
            }
            Err(_) => {
                warn!(
                    source = source.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "summary source timed out"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Script, ScriptedSource, acquirer};

    #[test]
    fn usable_rejects_empty_and_sentinel() {
        assert!(is_usable("Pistons convert pressure into motion."));
        assert!(!is_usable(""));
        assert!(!is_usable("   \n"));
        assert!(!is_usable("No summary found."));
        assert!(!is_usable("Sorry, NO SUMMARY available"));
    }

    #[test]
    fn glossary_dedups_and_caps() {
        let text = "Diesel engines beat Otto cycles. Diesel Rudolf patented the Diesel-Engine in Germany.";
        let terms = extract_glossary_terms(text, 3);
        assert_eq!(terms, vec!["Diesel", "Otto", "Rudolf"]);

        let terms = extract_glossary_terms(text, 10);
        assert!(terms.contains(&"Diesel-Engine".to_string()));
        assert!(terms.contains(&"Germany".to_string()));
        assert_eq!(terms.iter().filter(|t| *t == "Diesel").count(), 1);
    }

    #[test]
    fn glossary_ignores_short_and_lowercase_words() {
        assert!(extract_glossary_terms("The car has an ECU and fuel.", 3).is_empty());
    }

    #[tokio::test]
    async fn usable_primary_skips_fallback() {
        let primary = ScriptedSource::always("primary", Script::Text("Spark Plugs ignite fuel.".into()));
        let fallback = ScriptedSource::always("fallback", Script::Text("unused".into()));
        let acq = acquirer(primary.clone(), fallback.clone());

        let record = acq.acquire("ignition", &SkillLevel::Novice).await.unwrap();
        assert_eq!(record.source, Source::Primary);
        assert_eq!(record.topic, "ignition");
        assert!(record.summary.contains("Spark Plugs ignite fuel."));
        assert_eq!(record.glossary_terms, vec!["Spark", "Plugs"]);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn sentinel_primary_uses_fallback() {
        let primary = ScriptedSource::always("primary", Script::Sentinel);
        let fallback = ScriptedSource::always("fallback", Script::Text("Sensors read Voltage.".into()));
        let acq = acquirer(primary, fallback.clone());

        let record = acq.acquire("sensor", &SkillLevel::Advanced).await.unwrap();
        assert_eq!(record.source, Source::Fallback);
        assert!(record.summary.starts_with("Technical summary:"));
        assert!(record.glossary_terms.is_empty());
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn failing_primary_uses_fallback() {
        let primary = ScriptedSource::always("primary", Script::Fail);
        let fallback = ScriptedSource::always("fallback", Script::Text("Gears shift.".into()));
        let record = acquirer(primary, fallback)
            .acquire("transmission", &SkillLevel::Intermediate)
            .await
            .unwrap();
        assert_eq!(record.source, Source::Fallback);
    }

    #[tokio::test]
    async fn hanging_primary_times_out_into_fallback() {
        let primary = ScriptedSource::always("primary", Script::Hang);
        let fallback = ScriptedSource::always("fallback", Script::Text("Timing matters.".into()));
        let record = acquirer(primary, fallback)
            .acquire("ignition timing", &SkillLevel::Novice)
            .await
            .unwrap();
        assert_eq!(record.source, Source::Fallback);
    }

    #[tokio::test]
    async fn both_empty_is_acquisition_error() {
        let primary = ScriptedSource::always("primary", Script::Empty);
        let fallback = ScriptedSource::always("fallback", Script::Empty);
        let err = acquirer(primary, fallback)
            .acquire("xyzzy", &SkillLevel::Novice)
            .await
            .unwrap_err();
        assert!(matches!(err, TopicflowError::Acquisition { .. }));
    }

    #[tokio::test]
    async fn both_failing_is_acquisition_error() {
        let primary = ScriptedSource::always("primary", Script::Fail);
        let fallback = ScriptedSource::always("fallback", Script::Hang);
        let err = acquirer(primary, fallback)
            .acquire("xyzzy", &SkillLevel::Novice)
            .await
            .unwrap_err();
        assert!(matches!(err, TopicflowError::Acquisition { .. }));
    }

    #[tokio::test]
    async fn unknown_level_gets_no_glossary() {
        let primary = ScriptedSource::always("primary", Script::Text("Calibration Maps".into()));
        let fallback = ScriptedSource::always("fallback", Script::Empty);
        let record = acquirer(primary, fallback)
            .acquire("calibration", &SkillLevel::Other("guru".into()))
            .await
            .unwrap();
        assert_eq!(record.level, SkillLevel::Other("guru".into()));
        assert!(record.glossary_terms.is_empty());
        assert_eq!(record.summary, "Calibration Maps");
    }

    #[tokio::test]
    async fn glossary_cap_is_configurable() {
        let primary = ScriptedSource::always(
            "primary",
            Script::Text("Alpha Bravo Charlie Delta Echo".into()),
        );
        let fallback = ScriptedSource::always("fallback", Script::Empty);
        let record = acquirer(primary, fallback)
            .with_glossary_cap(1)
            .acquire("alphabet", &SkillLevel::Novice)
            .await
            .unwrap();
        assert_eq!(record.glossary_terms, vec!["Alpha"]);
    }
}
