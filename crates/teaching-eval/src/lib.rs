//! Scoring aggregation, workflow rules, and HTTP surface for teaching-office evaluations.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
