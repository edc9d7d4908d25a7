//! Encyclopedia page-summary source (primary).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use topicflow_shared::{Result, SkillLevel, SourcesConfig, TopicflowError};
use tracing::{debug, instrument};
use url::Url;

use crate::{FetchedSummary, SummarySource, build_client};

/// Returned when the page exists but carries no extract. Callers treat any
/// summary containing "no summary" as unusable.
pub const NO_SUMMARY_SENTINEL: &str = "No summary found.";

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: Option<String>,
}

/// Fetches `{base_url}/{Topic_With_Underscores}` and reads its `extract`.
pub struct EncyclopediaSource {
    client: Client,
    base_url: Url,
}

impl EncyclopediaSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        Self::with_base_url(
            &config.primary_base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            TopicflowError::config(format!("invalid primary_base_url '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TopicflowError::config(format!(
                "primary_base_url '{base_url}' cannot take path segments"
            )));
        }

        Ok(Self {
            client: build_client(timeout)?,
            base_url,
        })
    }

    /// Page URL for a topic: spaces become underscores, the rest is
    /// percent-encoded as a single path segment.
    fn page_url(&self, topic: &str) -> Url {
        let title = topic.replace(' ', "_");
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&title);
        }
        url
    }
}

#[async_trait]
impl SummarySource for EncyclopediaSource {
    #[instrument(skip_all, fields(topic = %topic, level = %level))]
    async fn fetch(&self, topic: &str, level: &SkillLevel) -> Result<FetchedSummary> {
        let url = self.page_url(topic);
        debug!(%url, "requesting page summary");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| TopicflowError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "no page for topic");
            return Ok(FetchedSummary::empty());
        }
        if !status.is_success() {
            return Err(TopicflowError::Network(format!("{url}: HTTP {status}")));
        }

        let page: PageSummary = response
            .json()
            .await
            .map_err(|e| TopicflowError::parse(format!("{url}: invalid summary body: {e}")))?;

        match page.extract.filter(|text| !text.trim().is_empty()) {
            Some(extract) => Ok(FetchedSummary::toned(extract, level)),
            None => Ok(FetchedSummary {
                summary: NO_SUMMARY_SENTINEL.to_string(),
                raw_text: String::new(),
            }),
        }
    }

    fn name(&self) -> &str {
        "encyclopedia"
    }
}
