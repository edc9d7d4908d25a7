//! Shared types, error model, and configuration for Topicflow.
//!
//! This crate is the foundation depended on by all other Topicflow crates.
//! It provides:
//! - [`TopicflowError`]: the unified error type
//! - Domain types ([`SkillLevel`], [`SummaryRecord`], [`EvaluationResult`],
//!   [`DigestEntry`], [`RunLogEntry`], ...)
//! - Configuration ([`AppConfig`], [`SourcesConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PipelineConfig, SourcesConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, TopicflowError};
pub use types::{
    DigestEntry, EvaluationResult, Priority, RunId, RunLogEntry, SectionEntry, SkillLevel, Source,
    SummaryRecord, TopicList, WeeklyDigest,
};
