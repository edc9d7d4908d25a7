//! Autonomous pipeline: topics → acquire → score → route → digest → run log.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use topicflow_shared::{
    EvaluationResult, Result, RunId, RunLogEntry, SkillLevel, SummaryRecord, TopicflowError,
};
use topicflow_storage::Stores;

use crate::acquire::SourceAcquirer;
use crate::scoring::Scorer;
use crate::{digest, routing};

/// Per-topic processing stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquiring,
    Remembering,
    Scoring,
    Routing,
    Aggregating,
    Logging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Acquiring => "acquiring",
            Self::Remembering => "remembering",
            Self::Scoring => "scoring",
            Self::Routing => "routing",
            Self::Aggregating => "aggregating",
            Self::Logging => "logging",
        })
    }
}

/// Everything written for one successfully processed topic.
#[derive(Debug, Clone)]
pub struct ProcessedTopic {
    pub record: SummaryRecord,
    pub evaluation: EvaluationResult,
    pub sections: Vec<&'static str>,
    pub log_entry: RunLogEntry,
}

#[derive(Debug, Clone)]
pub enum TopicOutcome {
    Success(Box<ProcessedTopic>),
    /// Neither source had content; nothing was written.
    Skipped { reason: String },
    /// A later stage failed; stages before it stay persisted.
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone)]
pub struct TopicReport {
    pub topic: String,
    pub outcome: TopicOutcome,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub topics: Vec<TopicReport>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, TopicOutcome::Success(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TopicOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TopicOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&TopicOutcome) -> bool) -> usize {
        self.topics.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a topic is acquired.
    fn topic_started(&self, topic: &str, current: usize, total: usize);
    /// Called as a topic moves between stages.
    fn stage(&self, topic: &str, stage: Stage);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn topic_started(&self, _topic: &str, _current: usize, _total: usize) {}
    fn stage(&self, _topic: &str, _stage: Stage) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct PipelineRunner {
    acquirer: Arc<SourceAcquirer>,
    scorer: Scorer,
    level: SkillLevel,
}

impl PipelineRunner {
    pub fn new(acquirer: Arc<SourceAcquirer>, scorer: Scorer, level: SkillLevel) -> Self {
        Self {
            acquirer,
            scorer,
            level,
        }
    }

    /// Process `topics` in order.
    ///
    /// Store documents are loaded once up front, so a malformed document
    /// aborts the run before anything is written. After that, per-topic
    /// problems are reported in the [`RunReport`] and the run continues.
    #[instrument(skip_all, fields(topics = topics.len(), level = %self.level))]
    pub async fn run(
        &self,
        stores: &Stores,
        topics: &[String],
        progress: &dyn ProgressReporter,
    ) -> Result<RunReport> {
        let start = Instant::now();
        let run_id = RunId::new();
        let started_at = Utc::now();

        info!(%run_id, "starting autonomous run");

        progress.phase("Checking stores");
        preflight(stores).await?;

        progress.phase("Processing topics");
        let total = topics.len();
        let mut reports = Vec::with_capacity(total);

        for (i, topic) in topics.iter().enumerate() {
            progress.topic_started(topic, i + 1, total);
            let outcome = self.process_topic(stores, run_id, topic, progress).await;

            match &outcome {
                TopicOutcome::Success(p) => info!(
                    topic = %topic,
                    source = %p.record.source,
                    clarity = p.evaluation.clarity_score,
                    tone = p.evaluation.tone_fit_score,
                    "topic processed"
                ),
                TopicOutcome::Skipped { reason } => {
                    warn!(topic = %topic, %reason, "topic skipped")
                }
                TopicOutcome::Failed { stage, error } => {
                    warn!(topic = %topic, %stage, %error, "topic failed")
                }
            }

            reports.push(TopicReport {
                topic: topic.clone(),
                outcome,
            });
        }

        let report = RunReport {
            run_id,
            started_at,
            elapsed: start.elapsed(),
            topics: reports,
        };

        progress.done(&report);

        info!(
            %run_id,
            processed = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "autonomous run complete"
        );

        Ok(report)
    }

    async fn process_topic(
        &self,
        stores: &Stores,
        run_id: RunId,
        topic: &str,
        progress: &dyn ProgressReporter,
    ) -> TopicOutcome {
        progress.stage(topic, Stage::Acquiring);
        let record = match self.acquirer.acquire(topic, &self.level).await {
            Ok(record) => record,
            Err(TopicflowError::Acquisition { reason, .. }) => {
                return TopicOutcome::Skipped { reason };
            }
            Err(e) => {
                return TopicOutcome::Failed {
                    stage: Stage::Acquiring,
                    error: e.to_string(),
                };
            }
        };

        match self.record_topic(stores, run_id, record, progress).await {
            Ok(processed) => TopicOutcome::Success(Box::new(processed)),
            Err((stage, e)) => TopicOutcome::Failed {
                stage,
                error: e.to_string(),
            },
        }
    }

    /// Persist every stage for an acquired record, stopping at the first
    /// failing stage.
    async fn record_topic(
        &self,
        stores: &Stores,
        run_id: RunId,
        record: SummaryRecord,
        progress: &dyn ProgressReporter,
    ) -> std::result::Result<ProcessedTopic, (Stage, TopicflowError)> {
        let topic = record.topic.as_str();
        let level = &record.level;

        progress.stage(topic, Stage::Remembering);
        stores
            .upsert_summary(&record)
            .await
            .map_err(at(Stage::Remembering))?;

        progress.stage(topic, Stage::Scoring);
        let evaluation = self.scorer.evaluate(&record.summary, level);
        stores
            .upsert_evaluation(topic, &evaluation)
            .await
            .map_err(at(Stage::Scoring))?;

        progress.stage(topic, Stage::Routing);
        let sections = routing::distribute(stores, topic, &record.summary, level)
            .await
            .map_err(at(Stage::Routing))?;

        progress.stage(topic, Stage::Aggregating);
        digest::aggregate(stores, topic, &record.summary, level)
            .await
            .map_err(at(Stage::Aggregating))?;

        progress.stage(topic, Stage::Logging);
        let log_entry = RunLogEntry {
            run_id,
            topic: topic.to_string(),
            level: level.clone(),
            timestamp: Utc::now(),
            source: record.source,
            clarity_score: evaluation.clarity_score,
            tone_score: evaluation.tone_fit_score,
        };
        stores
            .append_run_log(log_entry.clone())
            .await
            .map_err(at(Stage::Logging))?;

        Ok(ProcessedTopic {
            sections: sections.into_iter().collect(),
            record,
            evaluation,
            log_entry,
        })
    }
}

fn at(stage: Stage) -> impl FnOnce(TopicflowError) -> (Stage, TopicflowError) {
    move |e| (stage, e)
}

/// Load every document the run writes to.
async fn preflight(stores: &Stores) -> Result<()> {
    stores.memory.load().await?;
    stores.evaluations.load().await?;
    stores.sections.load().await?;
    stores.inbox.load().await?;
    stores.run_log.load().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
