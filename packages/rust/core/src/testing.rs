//! Scripted summary sources and temp-dir helpers shared by the unit tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use topicflow_fetch::{FetchedSummary, NO_SUMMARY_SENTINEL, SummarySource};
use topicflow_shared::{Result, SkillLevel, TopicflowError};

use crate::acquire::SourceAcquirer;

/// What a scripted source does for a given topic.
#[derive(Clone)]
pub(crate) enum Script {
    /// Raw text, toned for the requested level.
    Text(String),
    /// Page found but without an extract.
    Sentinel,
    /// Nothing found.
    Empty,
    /// Transport failure.
    Fail,
    /// Never answers within any sane timeout.
    Hang,
}

type ScriptFn = dyn Fn(&str) -> Script + Send + Sync;

pub(crate) struct ScriptedSource {
    name: &'static str,
    script: Box<ScriptFn>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new(
        name: &'static str,
        script: impl Fn(&str) -> Script + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    /// Same answer for every topic.
    pub(crate) fn always(name: &'static str, script: Script) -> Arc<Self> {
        Self::new(name, move |_| script.clone())
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummarySource for ScriptedSource {
    async fn fetch(&self, topic: &str, level: &SkillLevel) -> Result<FetchedSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.script)(topic) {
            Script::Text(text) => Ok(FetchedSummary::toned(text, level)),
            Script::Sentinel => Ok(FetchedSummary {
                summary: NO_SUMMARY_SENTINEL.to_string(),
                raw_text: String::new(),
            }),
            Script::Empty => Ok(FetchedSummary::empty()),
            Script::Fail => Err(TopicflowError::Network(format!("{}: connection refused", self.name))),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(FetchedSummary::empty())
            }
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

pub(crate) fn acquirer(primary: Arc<ScriptedSource>, fallback: Arc<ScriptedSource>) -> SourceAcquirer {
    SourceAcquirer::new(primary, fallback, Duration::from_millis(200))
}

pub(crate) fn temp_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tf-core-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
