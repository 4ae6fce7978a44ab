//! Data layer for Alert Insights.
//!
//! Reads portal CSV exports, normalizes them into alert records, aggregates
//! the records into a dashboard summary and runs the top-level analysis
//! pipeline. Application telemetry exports are summarized alongside.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod summarizer;
pub mod telemetry;

pub use analysis::{
    analyze_alert_csv, analyze_sources, AnalysisMetadata, AnalysisResult, SourceFile,
};
pub use insights_core as core;
pub use telemetry::{ApplicationInsightsSummary, TelemetrySource};
