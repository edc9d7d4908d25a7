//! Core pipeline orchestration and domain logic for Topicflow.
//!
//! This crate ties acquisition, scoring, routing, and digest aggregation
//! into end-to-end workflows (the autonomous `pipeline` run and the
//! request-style operations in `service`).

pub mod acquire;
pub mod content;
pub mod digest;
pub mod pipeline;
pub mod routing;
pub mod scoring;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
