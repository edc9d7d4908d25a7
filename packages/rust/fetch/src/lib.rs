//! Summary sources: the capabilities the acquirer draws summaries from.
//!
//! This crate provides:
//! - [`SummarySource`]: the async capability trait ("fetch text for a topic")
//! - [`EncyclopediaSource`]: page-summary REST endpoint (primary)
//! - [`WebSearchSource`]: HTML search result snippets (fallback)
//! - [`tone`]: skill-level framing applied by every source

mod encyclopedia;
mod search;
pub mod tone;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use topicflow_shared::{Result, SkillLevel, TopicflowError};

pub use encyclopedia::{EncyclopediaSource, NO_SUMMARY_SENTINEL};
pub use search::WebSearchSource;
pub use tone::apply_skill_level_tone;

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Topicflow/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// What a source hands back for one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedSummary {
    /// Tone-adjusted summary text. Empty means "nothing found".
    pub summary: String,
    /// Text before tone adjustment, used for glossary extraction.
    pub raw_text: String,
}

impl FetchedSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap `raw` in the framing for `level`. Empty input stays empty.
    pub fn toned(raw: String, level: &SkillLevel) -> Self {
        if raw.trim().is_empty() {
            return Self::empty();
        }
        Self {
            summary: apply_skill_level_tone(&raw, level),
            raw_text: raw,
        }
    }
}

/// A capability that turns a topic into summary text.
///
/// "Not found" is an `Ok` with an empty (or sentinel) summary; `Err` is
/// reserved for transport failures.
#[async_trait]
pub trait SummarySource: Send + Sync {
    async fn fetch(&self, topic: &str, level: &SkillLevel) -> Result<FetchedSummary>;

    /// Human-readable source name for tracing.
    fn name(&self) -> &str;
}

/// Build a reqwest client with the shared settings.
fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| TopicflowError::Network(format!("failed to build HTTP client: {e}")))
}
