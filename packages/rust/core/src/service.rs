//! Request-style operations over the stores: research a single topic,
//! render content, read the inbox, build digests, run the pipeline and
//! report status.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use topicflow_shared::{
    AppConfig, EvaluationResult, Result, SkillLevel, SummaryRecord, TopicflowError, WeeklyDigest,
};
use topicflow_storage::{InboxDoc, Stores, load_topics};

use crate::acquire::SourceAcquirer;
use crate::content::{ContentFormat, generate_content};
use crate::pipeline::{PipelineRunner, ProgressReporter, RunReport};
use crate::scoring::{EvaluationReport, Scorer, rank_evaluations};
use crate::{digest, routing};

/// Result of researching one topic on demand.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub record: SummaryRecord,
    pub evaluation: EvaluationResult,
    pub sections: Vec<&'static str>,
}

/// Snapshot of the data directory.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    /// Timestamp of the newest run-log entry.
    pub last_run: Option<DateTime<Utc>>,
    /// Topics in the topics file.
    pub topic_count: usize,
    /// Records in the memory store.
    pub memory_size: usize,
    /// Digest entries across all levels.
    pub digest_items: usize,
}

pub struct Service {
    config: AppConfig,
    acquirer: Arc<SourceAcquirer>,
    scorer: Scorer,
}

impl Service {
    pub fn new(config: AppConfig, acquirer: SourceAcquirer) -> Self {
        let scorer = Scorer::new(config.pipeline.ideal_length);
        Self {
            config,
            acquirer: Arc::new(acquirer),
            scorer,
        }
    }

    /// Service backed by the HTTP sources named in `config`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let acquirer = SourceAcquirer::from_config(&config)?;
        Ok(Self::new(config, acquirer))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.defaults.data_dir)
    }

    fn stores(&self, user: Option<&str>) -> Result<Stores> {
        Stores::open(&self.data_dir(), user)
    }

    /// Acquire a summary for `topic`, remember it, score it, and file it
    /// into sections and the digest.
    #[instrument(skip_all, fields(topic = %topic, level = %level, user = user.unwrap_or("-")))]
    pub async fn research(
        &self,
        topic: &str,
        level: &SkillLevel,
        user: Option<&str>,
    ) -> Result<ResearchOutcome> {
        if topic.trim().is_empty() {
            return Err(TopicflowError::validation("topic must not be empty"));
        }
        let stores = self.stores(user)?;

        let record = self.acquirer.acquire(topic, level).await?;
        stores.upsert_summary(&record).await?;

        let evaluation = self.scorer.evaluate(&record.summary, level);
        stores.upsert_evaluation(topic, &evaluation).await?;

        let sections = routing::distribute(&stores, topic, &record.summary, level).await?;
        digest::aggregate(&stores, topic, &record.summary, level).await?;

        info!(source = %record.source, sections = sections.len(), "research complete");

        Ok(ResearchOutcome {
            record,
            evaluation,
            sections: sections.into_iter().collect(),
        })
    }

    /// Render remembered research for `topic`.
    pub async fn generate(
        &self,
        topic: &str,
        format: ContentFormat,
        user: Option<&str>,
    ) -> Result<String> {
        let record = self
            .stores(user)?
            .get_summary(topic)
            .await?
            .ok_or_else(|| {
                TopicflowError::validation(format!(
                    "no research found for '{topic}'; research it first"
                ))
            })?;
        Ok(generate_content(&record, format))
    }

    pub async fn inbox(&self, user: Option<&str>) -> Result<InboxDoc> {
        self.stores(user)?.inbox.load().await
    }

    pub async fn weekly_digest(&self, user: Option<&str>) -> Result<WeeklyDigest> {
        digest::weekly_digest(&self.stores(user)?).await
    }

    /// Run the pipeline over the configured topics file at the default level.
    pub async fn run_autonomous(&self, progress: &dyn ProgressReporter) -> Result<RunReport> {
        let topics = load_topics(&self.config.defaults.topics_path()).await?;
        let runner = PipelineRunner::new(
            Arc::clone(&self.acquirer),
            self.scorer.clone(),
            self.config.defaults.skill_level(),
        );
        runner.run(&self.stores(None)?, &topics.topics, progress).await
    }

    pub async fn status(&self, user: Option<&str>) -> Result<StatusSummary> {
        let stores = self.stores(user)?;
        let run_log = stores.run_log.load().await?;
        let topics = load_topics(&self.config.defaults.topics_path()).await?;

        Ok(StatusSummary {
            last_run: run_log.iter().map(|entry| entry.timestamp).max(),
            topic_count: topics.topics.len(),
            memory_size: stores.memory.load().await?.len(),
            digest_items: stores.inbox.load().await?.digest_item_count(),
        })
    }

    /// Best and worst `n` evaluated topics.
    pub async fn evaluation_report(&self, n: usize) -> Result<EvaluationReport> {
        let evaluations = self.stores(None)?.evaluations.load().await?;
        Ok(rank_evaluations(&evaluations, n))
    }
}

#[cfg(test)]
mod tests {
    use topicflow_shared::{DefaultsConfig, Source, TopicList};
    use topicflow_storage::JsonStore;

    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::testing::{Script, ScriptedSource, acquirer, temp_root};

    fn service(root: &std::path::Path, primary: Arc<ScriptedSource>) -> Service {
        let config = AppConfig {
            defaults: DefaultsConfig {
                data_dir: root.display().to_string(),
                ..DefaultsConfig::default()
            },
            ..AppConfig::default()
        };
        let fallback = ScriptedSource::always("fallback", Script::Empty);
        Service::new(config, acquirer(primary, fallback))
    }

    fn text_source() -> Arc<ScriptedSource> {
        ScriptedSource::new("primary", |topic| match topic {
            "xyzzy" => Script::Empty,
            _ => Script::Text(format!("The Diesel Engine explains {topic}.")),
        })
    }

    #[tokio::test]
    async fn research_persists_everywhere() {
        let root = temp_root();
        let svc = service(&root, text_source());

        let outcome = svc
            .research("fuel injection basics", &SkillLevel::Novice, None)
            .await
            .unwrap();
        assert_eq!(outcome.record.source, Source::Primary);
        assert_eq!(outcome.record.glossary_terms, vec!["Diesel", "Engine"]);
        assert!(outcome.sections.contains(&"basic_concepts"));
        assert!(outcome.sections.contains(&"mechanical_systems"));

        let stores = Stores::open(&root, None).unwrap();
        assert!(stores.get_summary("fuel injection basics").await.unwrap().is_some());
        assert_eq!(stores.evaluations.load().await.unwrap().len(), 1);
        assert_eq!(stores.inbox.load().await.unwrap().digest_item_count(), 1);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn research_failures_surface_as_errors() {
        let root = temp_root();
        let svc = service(&root, text_source());

        let err = svc
            .research("xyzzy", &SkillLevel::Novice, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TopicflowError::Acquisition { .. }));

        let err = svc.research("  ", &SkillLevel::Novice, None).await.unwrap_err();
        assert!(matches!(err, TopicflowError::Validation { .. }));

        let err = svc
            .research("piston", &SkillLevel::Novice, Some("../etc"))
            .await
            .unwrap_err();
        assert!(matches!(err, TopicflowError::Validation { .. }));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn research_keeps_topic_verbatim() {
        let root = temp_root();
        let svc = service(&root, text_source());

        svc.research(" fuel ", &SkillLevel::Novice, None)
            .await
            .unwrap();

        let stores = Stores::open(&root, None).unwrap();
        let memory: Vec<String> = stores.memory.load().await.unwrap().into_keys().collect();
        assert_eq!(memory, vec![" fuel ".to_string()]);
        let evaluations: Vec<String> =
            stores.evaluations.load().await.unwrap().into_keys().collect();
        assert_eq!(evaluations, vec![" fuel ".to_string()]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn users_get_separate_memory_and_inbox() {
        let root = temp_root();
        let svc = service(&root, text_source());

        svc.research("piston", &SkillLevel::Novice, Some("alice"))
            .await
            .unwrap();

        assert_eq!(svc.inbox(Some("alice")).await.unwrap().digest_item_count(), 1);
        assert_eq!(svc.inbox(None).await.unwrap().digest_item_count(), 0);
        assert_eq!(svc.inbox(Some("bob")).await.unwrap().digest_item_count(), 0);

        svc.generate("piston", ContentFormat::Educational, Some("alice"))
            .await
            .unwrap();
        let err = svc
            .generate("piston", ContentFormat::Educational, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TopicflowError::Validation { .. }));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn generate_renders_stored_record() {
        let root = temp_root();
        let svc = service(&root, text_source());
        svc.research("ignition", &SkillLevel::Novice, None)
            .await
            .unwrap();

        let text = svc
            .generate("ignition", ContentFormat::Educational, None)
            .await
            .unwrap();
        assert!(text.contains("**ignition**"));
        assert!(text.contains("Key terms to remember: Diesel, Engine."));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn autonomous_run_and_status() {
        let root = temp_root();
        let svc = service(&root, text_source());

        let status = svc.status(None).await.unwrap();
        assert!(status.last_run.is_none());
        assert_eq!(status.topic_count, 0);

        JsonStore::<TopicList>::new(root.join("autonomous_topics.json"))
            .save(&TopicList {
                topics: vec!["engine".into(), "xyzzy".into(), "sensor".into()],
            })
            .await
            .unwrap();

        let report = svc.run_autonomous(&SilentProgress).await.unwrap();
        assert_eq!(report.processed(), 2);
        assert_eq!(report.skipped(), 1);

        let status = svc.status(None).await.unwrap();
        assert!(status.last_run.is_some());
        assert_eq!(status.topic_count, 3);
        assert_eq!(status.memory_size, 2);
        assert_eq!(status.digest_items, 2);

        let digest = svc.weekly_digest(None).await.unwrap();
        assert_eq!(digest.insights.len(), 2);
        assert_eq!(digest.recommendations.len(), 2);
        assert_eq!(svc.inbox(None).await.unwrap().snapshots.len(), 1);

        let ranking = svc.evaluation_report(1).await.unwrap();
        assert_eq!(ranking.top.len(), 1);
        assert_eq!(ranking.low.len(), 1);

        std::fs::remove_dir_all(&root).ok();
    }
}
