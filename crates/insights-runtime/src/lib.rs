//! Runtime layer for Alert Insights.
//!
//! Owns the only asynchronous boundary of the system: retrieving the export
//! files under a deadline before the synchronous analysis runs.

pub mod fetcher;

pub use fetcher::DashboardFetcher;
pub use insights_core as core;
pub use insights_data as data;
