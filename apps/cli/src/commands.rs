//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use topicflow_core::content::ContentFormat;
use topicflow_core::pipeline::{ProgressReporter, RunReport, Stage, TopicOutcome};
use topicflow_core::service::Service;
use topicflow_shared::{AppConfig, SkillLevel, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Topicflow: skill-tailored topic research, scored and routed.
#[derive(Parser)]
#[command(
    name = "topicflow",
    version,
    about = "Research topics, score the summaries, and file them into sections and digests.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.topicflow/topicflow.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the JSON documents (overrides config).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the autonomous pipeline over the topics file.
    Run {
        /// Topics file (overrides config).
        #[arg(long)]
        topics: Option<PathBuf>,

        /// Skill level for every topic (overrides config).
        #[arg(short, long)]
        level: Option<String>,
    },

    /// Research a single topic and file the result.
    Research {
        /// Topic to research.
        topic: String,

        /// Reader skill level.
        #[arg(short, long, default_value = "novice")]
        level: String,

        /// Keep memory and inbox under this user id.
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Generate content from previously researched topic.
    Generate {
        /// Topic already present in memory.
        topic: String,

        /// Content format: educational or linkedin_post.
        #[arg(short, long, default_value = "educational")]
        format: String,

        #[arg(short, long)]
        user: Option<String>,
    },

    /// Print the inbox document.
    Inbox {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Build and store a weekly digest from memory.
    Digest {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Summarize the data directory.
    Status {
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Show best and worst evaluated topics.
    Report {
        /// How many topics to list at each end.
        #[arg(long, default_value_t = 3)]
        top: usize,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    // Target prefixes match every `topicflow_*` crate as well as the binary.
    let filter = match cli.verbose {
        0 => "topicflow=info",
        1 => "topicflow=debug",
        _ => "topicflow=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&cli).await,
        };
    }

    let mut config = resolve_config(&cli)?;

    match cli.command {
        Command::Run { topics, level } => {
            if let Some(topics) = topics {
                let topics = std::path::absolute(&topics)
                    .wrap_err_with(|| format!("cannot resolve {}", topics.display()))?;
                config.defaults.topics_file = topics.display().to_string();
            }
            if let Some(level) = level {
                config.defaults.level = level;
            }
            cmd_run(config).await
        }
        Command::Research { topic, level, user } => {
            cmd_research(config, &topic, &level, user.as_deref()).await
        }
        Command::Generate {
            topic,
            format,
            user,
        } => cmd_generate(config, &topic, &format, user.as_deref()).await,
        Command::Inbox { user } => {
            let service = Service::from_config(config)?;
            print_json(&service.inbox(user.as_deref()).await?)
        }
        Command::Digest { user } => {
            let service = Service::from_config(config)?;
            print_json(&service.weekly_digest(user.as_deref()).await?)
        }
        Command::Status { user } => {
            let service = Service::from_config(config)?;
            print_json(&service.status(user.as_deref()).await?)
        }
        Command::Report { top } => {
            let service = Service::from_config(config)?;
            print_json(&service.evaluation_report(top).await?)
        }
        Command::Config { .. } => Ok(()),
    }
}

/// Config file (or defaults) with global flag overrides applied.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.defaults.data_dir = dir.display().to_string();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: AppConfig) -> Result<()> {
    info!(
        topics = %config.defaults.topics_path().display(),
        level = %config.defaults.level,
        "running autonomous pipeline"
    );

    let service = Service::from_config(config)?;
    let reporter = CliProgress::new();
    let report = reporter.finish_on_error(service.run_autonomous(&reporter).await)?;

    println!();
    println!("  Autonomous run complete");
    println!("  Run:       {}", report.run_id);
    println!("  Processed: {}", report.processed());
    println!("  Skipped:   {}", report.skipped());
    println!("  Failed:    {}", report.failed());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    for topic in &report.topics {
        match &topic.outcome {
            TopicOutcome::Success(p) => println!(
                "  ✓ {:<30} {:<9} clarity {:>5.1}  tone {:>5.1}",
                topic.topic,
                p.record.source.to_string(),
                p.evaluation.clarity_score,
                p.evaluation.tone_fit_score
            ),
            TopicOutcome::Skipped { reason } => {
                println!("  - {:<30} skipped: {reason}", topic.topic)
            }
            TopicOutcome::Failed { stage, error } => {
                println!("  ✗ {:<30} failed while {stage}: {error}", topic.topic)
            }
        }
    }
    if !report.topics.is_empty() {
        println!();
    }

    Ok(())
}

async fn cmd_research(
    config: AppConfig,
    topic: &str,
    level: &str,
    user: Option<&str>,
) -> Result<()> {
    let level = SkillLevel::from(level);
    info!(topic, %level, "researching topic");

    let service = Service::from_config(config)?;
    let spinner = CliProgress::new();
    spinner.phase(&format!("Researching {topic}"));
    let outcome = service.research(topic, &level, user).await;
    spinner.spinner.finish_and_clear();

    print_json(&outcome?)
}

async fn cmd_generate(
    config: AppConfig,
    topic: &str,
    format: &str,
    user: Option<&str>,
) -> Result<()> {
    let format: ContentFormat = format.parse()?;
    let service = Service::from_config(config)?;
    let content = service.generate(topic, format, user).await?;
    println!("{content}");
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }

    /// Clear the spinner when `result` is an error; on success `done`
    /// clears it.
    fn finish_on_error<T, E>(
        &self,
        result: std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        if result.is_err() {
            self.spinner.finish_and_clear();
        }
        result
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn topic_started(&self, topic: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {topic}"));
    }

    fn stage(&self, topic: &str, stage: Stage) {
        self.spinner.set_message(format!("{topic}: {stage}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use topicflow_shared::TopicflowError;

    use super::*;

    fn hidden() -> CliProgress {
        CliProgress {
            spinner: ProgressBar::hidden(),
        }
    }

    #[test]
    fn failed_run_clears_spinner() {
        let progress = hidden();
        progress.phase("Checking stores");

        let result: std::result::Result<(), TopicflowError> =
            Err(TopicflowError::validation("broken store"));
        assert!(progress.finish_on_error(result).is_err());
        assert!(progress.spinner.is_finished());
    }

    #[test]
    fn successful_result_leaves_spinner_to_done() {
        let progress = hidden();
        let result: std::result::Result<u8, TopicflowError> = Ok(3);
        assert_eq!(progress.finish_on_error(result).unwrap(), 3);
        assert!(!progress.spinner.is_finished());
    }
}
