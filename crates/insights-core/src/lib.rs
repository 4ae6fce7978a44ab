//! Shared types for Alert Insights.
//!
//! Holds the alert record and dashboard summary models, the resource
//! classifier, command-line settings, formatting helpers and the error type
//! used by every other crate in the workspace.

pub mod classifier;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{InsightsError, Result};
