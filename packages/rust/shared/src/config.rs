//! Application configuration for Topicflow.
//!
//! User config lives at `~/.topicflow/topicflow.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TopicflowError};
use crate::types::SkillLevel;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "topicflow.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".topicflow";

// ---------------------------------------------------------------------------
// Config structs (matching topicflow.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Summary source endpoints and limits.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Pipeline tuning.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the JSON store documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Topic list consumed by the autonomous pipeline, relative to `data_dir`.
    #[serde(default = "default_topics_file")]
    pub topics_file: String,

    /// Skill level used by the autonomous pipeline.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            topics_file: default_topics_file(),
            level: default_level(),
        }
    }
}

impl DefaultsConfig {
    pub fn skill_level(&self) -> SkillLevel {
        SkillLevel::from(self.level.as_str())
    }

    /// Resolve the topics file against the data directory.
    pub fn topics_path(&self) -> PathBuf {
        Path::new(&self.data_dir).join(&self.topics_file)
    }
}

fn default_data_dir() -> String {
    ".".into()
}
fn default_topics_file() -> String {
    "autonomous_topics.json".into()
}
fn default_level() -> String {
    "novice".into()
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Per-call timeout for each summary source.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Encyclopedia summary endpoint; the topic is appended as a path segment.
    #[serde(default = "default_primary_base_url")]
    pub primary_base_url: String,

    /// HTML search endpoint queried with `?q=<topic>`.
    #[serde(default = "default_fallback_base_url")]
    pub fallback_base_url: String,

    /// Number of search snippets joined into the fallback text.
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,

    /// Fallback text is clipped to this many characters before tone adjustment.
    #[serde(default = "default_max_fallback_chars")]
    pub max_fallback_chars: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            primary_base_url: default_primary_base_url(),
            fallback_base_url: default_fallback_base_url(),
            max_snippets: default_max_snippets(),
            max_fallback_chars: default_max_fallback_chars(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_primary_base_url() -> String {
    "https://en.wikipedia.org/api/rest_v1/page/summary/".into()
}
fn default_fallback_base_url() -> String {
    "https://duckduckgo.com/html/".into()
}
fn default_max_snippets() -> usize {
    5
}
fn default_max_fallback_chars() -> usize {
    1000
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of glossary terms kept for novice summaries.
    #[serde(default = "default_glossary_cap")]
    pub glossary_cap: usize,

    /// Summary length (in characters) that scores full clarity.
    #[serde(default = "default_ideal_length")]
    pub ideal_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            glossary_cap: default_glossary_cap(),
            ideal_length: default_ideal_length(),
        }
    }
}

fn default_glossary_cap() -> usize {
    3
}
fn default_ideal_length() -> usize {
    700
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.topicflow/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TopicflowError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.topicflow/topicflow.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TopicflowError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        TopicflowError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.sources.timeout_secs == 0 {
        return Err(TopicflowError::config(
            "sources.timeout_secs must be greater than zero",
        ));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TopicflowError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TopicflowError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TopicflowError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
