//! JSON document stores for Topicflow.
//!
//! The [`Stores`] struct bundles five independent documents: research memory,
//! evaluations, section outputs, the digest inbox, and the run log. Nothing
//! ties them together; each is read and written on its own.
//!
//! **Access rules:**
//! - All mutations go through [`JsonStore::update`] (whole-document,
//!   locked, atomic on disk).
//! - Reads via [`JsonStore::load`] are lock-free snapshots.

mod document;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use topicflow_shared::{
    DigestEntry, EvaluationResult, Result, RunLogEntry, SectionEntry, SkillLevel, SummaryRecord,
    TopicList, TopicflowError, WeeklyDigest,
};
use tracing::{debug, warn};

pub use document::JsonStore;

pub const MEMORY_FILE: &str = "research_memory.json";
pub const EVALUATION_FILE: &str = "evaluation_results.json";
pub const SECTIONS_FILE: &str = "section_outputs.json";
pub const INBOX_FILE: &str = "internal_inbox.json";
pub const RUN_LOG_FILE: &str = "autonomous_log.json";

/// Topic → latest summary (last write wins).
pub type MemoryDoc = BTreeMap<String, SummaryRecord>;
/// Topic → latest evaluation (overwritten each run).
pub type EvaluationDoc = BTreeMap<String, EvaluationResult>;
/// Section name → append log of routed summaries.
pub type SectionsDoc = BTreeMap<String, Vec<SectionEntry>>;
/// Ordered audit trail of processed topics.
pub type RunLog = Vec<RunLogEntry>;

/// The inbox document: the per-level digest append logs plus any batch
/// weekly digests, keyed by their RFC 3339 timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboxDoc {
    #[serde(default, rename = "weekly_digest")]
    pub digest: BTreeMap<String, Vec<DigestEntry>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub snapshots: BTreeMap<String, WeeklyDigest>,
    /// Any other top-level keys, such as digests written directly under a
    /// timestamp key. Kept verbatim so rewrites never drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl InboxDoc {
    /// Total number of per-topic digest entries across all levels.
    pub fn digest_item_count(&self) -> usize {
        self.digest.values().map(Vec::len).sum()
    }
}

/// Check that a user id is safe to embed in a file name.
pub fn validate_user_id(user: &str) -> Result<()> {
    let ok = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(TopicflowError::validation(format!(
            "user id '{user}' may only contain ASCII letters, digits, '-' and '_'"
        )))
    }
}

/// `research_memory.json` → `research_memory.<user>.json`.
fn namespaced(file: &str, user: Option<&str>) -> String {
    match user {
        Some(user) => match file.rsplit_once('.') {
            Some((stem, ext)) => format!("{stem}.{user}.{ext}"),
            None => format!("{file}.{user}"),
        },
        None => file.to_string(),
    }
}

/// Handles to every store document under one data directory.
pub struct Stores {
    root: PathBuf,
    user: Option<String>,
    pub memory: JsonStore<MemoryDoc>,
    pub evaluations: JsonStore<EvaluationDoc>,
    pub sections: JsonStore<SectionsDoc>,
    pub inbox: JsonStore<InboxDoc>,
    pub run_log: JsonStore<RunLog>,
}

impl Stores {
    /// Open the stores under `root`. With a user id, the memory and inbox
    /// documents are namespaced to that user; the others stay shared.
    pub fn open(root: &Path, user: Option<&str>) -> Result<Self> {
        if let Some(user) = user {
            validate_user_id(user)?;
        }

        debug!(root = %root.display(), user = user.unwrap_or("-"), "opening stores");

        Ok(Self {
            root: root.to_path_buf(),
            user: user.map(str::to_string),
            memory: JsonStore::new(root.join(namespaced(MEMORY_FILE, user))),
            evaluations: JsonStore::new(root.join(EVALUATION_FILE)),
            sections: JsonStore::new(root.join(SECTIONS_FILE)),
            inbox: JsonStore::new(root.join(namespaced(INBOX_FILE, user))),
            run_log: JsonStore::new(root.join(RUN_LOG_FILE)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    // -----------------------------------------------------------------------
    // Memory
    // -----------------------------------------------------------------------

    /// Insert or overwrite the record for its topic.
    pub async fn upsert_summary(&self, record: &SummaryRecord) -> Result<()> {
        self.memory
            .update(|doc| {
                doc.insert(record.topic.clone(), record.clone());
            })
            .await
    }

    pub async fn get_summary(&self, topic: &str) -> Result<Option<SummaryRecord>> {
        Ok(self.memory.load().await?.remove(topic))
    }

    // -----------------------------------------------------------------------
    // Evaluations
    // -----------------------------------------------------------------------

    pub async fn upsert_evaluation(&self, topic: &str, eval: &EvaluationResult) -> Result<()> {
        self.evaluations
            .update(|doc| {
                doc.insert(topic.to_string(), eval.clone());
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// Append `entry` to every named section in one document write.
    pub async fn append_to_sections<'a>(
        &self,
        sections: impl IntoIterator<Item = &'a str>,
        entry: &SectionEntry,
    ) -> Result<()> {
        self.sections
            .update(|doc| {
                for section in sections {
                    doc.entry(section.to_string())
                        .or_default()
                        .push(entry.clone());
                }
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Inbox
    // -----------------------------------------------------------------------

    pub async fn append_digest(&self, level: &SkillLevel, entry: DigestEntry) -> Result<()> {
        self.inbox
            .update(|doc| {
                doc.digest
                    .entry(level.as_str().to_string())
                    .or_default()
                    .push(entry);
            })
            .await
    }

    pub async fn insert_weekly_digest(&self, digest: &WeeklyDigest) -> Result<()> {
        self.inbox
            .update(|doc| {
                doc.snapshots
                    .insert(digest.timestamp.to_rfc3339(), digest.clone());
            })
            .await
    }

    // -----------------------------------------------------------------------
    // Run log
    // -----------------------------------------------------------------------

    pub async fn append_run_log(&self, entry: RunLogEntry) -> Result<()> {
        self.run_log.update(|log| log.push(entry)).await
    }
}

/// Read the topic list. A missing file yields an empty list.
pub async fn load_topics(path: &Path) -> Result<TopicList> {
    let store: JsonStore<TopicList> = JsonStore::new(path);
    if !path.exists() {
        warn!(path = %path.display(), "topic file not found, nothing to process");
    }
    store.load().await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
