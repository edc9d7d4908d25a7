//! Web search snippet source (fallback).
//!
//! Queries an HTML search endpoint and stitches the first few result
//! snippets into a summary. The markup contract is a single CSS class
//! (`a.result__snippet`); anything else on the page is ignored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use topicflow_shared::{Result, SkillLevel, SourcesConfig, TopicflowError};
use tracing::{debug, instrument};
use url::Url;

use crate::{FetchedSummary, SummarySource, build_client};

const SNIPPET_SELECTOR: &str = "a.result__snippet";

pub struct WebSearchSource {
    client: Client,
    base_url: Url,
    max_snippets: usize,
    max_chars: usize,
}

impl WebSearchSource {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let base_url = Url::parse(&config.fallback_base_url).map_err(|e| {
            TopicflowError::config(format!(
                "invalid fallback_base_url '{}': {e}",
                config.fallback_base_url
            ))
        })?;

        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            base_url,
            max_snippets: config.max_snippets,
            max_chars: config.max_fallback_chars,
        })
    }

    fn search_url(&self, topic: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", topic);
        url
    }
}

/// Text of up to `max` snippets, one per line.
fn extract_snippets(html: &str, max: usize) -> Result<String> {
    let selector = Selector::parse(SNIPPET_SELECTOR)
        .map_err(|e| TopicflowError::parse(format!("bad snippet selector: {e}")))?;
    let doc = Html::parse_document(html);

    let snippets: Vec<String> = doc
        .select(&selector)
        .take(max)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    Ok(snippets.join("\n"))
}

fn clip_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[async_trait]
impl SummarySource for WebSearchSource {
    #[instrument(skip_all, fields(topic = %topic, level = %level))]
    async fn fetch(&self, topic: &str, level: &SkillLevel) -> Result<FetchedSummary> {
        let url = self.search_url(topic);
        debug!(%url, "querying web search");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| TopicflowError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TopicflowError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TopicflowError::Network(format!("{url}: failed to read body: {e}")))?;

        let snippets = extract_snippets(&body, self.max_snippets)?;
        debug!(chars = snippets.len(), "collected search snippets");

        Ok(FetchedSummary::toned(
            clip_chars(&snippets, self.max_chars),
            level,
        ))
    }

    fn name(&self) -> &str {
        "web-search"
    }
}
