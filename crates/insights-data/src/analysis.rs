//! Main analysis pipeline for Alert Insights.
//!
//! Turns loaded alert exports (and optionally telemetry rows) into an
//! [`AnalysisResult`] ready for rendering. Everything here is synchronous; the
//! file retrieval lives in the runtime crate.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use insights_core::models::{AlertRecord, DashboardSummary};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::aggregate;
use crate::reader::{parse_alert_records, CsvRow};
use crate::telemetry::{summarize_telemetry, ApplicationInsightsSummary};

// ── Public types ──────────────────────────────────────────────────────────────

/// Raw contents of one alert export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// Alert export files read, in concatenation order.
    pub source_files: Vec<String>,
    /// Alert records parsed across all source files.
    pub rows_parsed: usize,
    /// Wall-clock seconds spent reading the sources.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent parsing and aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of one dashboard fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: DashboardSummary,
    /// Present when a telemetry source was configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_insights: Option<ApplicationInsightsSummary>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Parse one alert export and aggregate it.
pub fn analyze_alert_csv(data: impl AsRef<[u8]>) -> DashboardSummary {
    aggregate(&parse_alert_records(data))
}

/// Aggregate already-loaded sources.
///
/// Records from every file in `alert_sources` are concatenated in order before
/// the single aggregation pass. `load_time_seconds` is recorded as given.
pub fn analyze_sources(
    alert_sources: &[SourceFile],
    telemetry_rows: Option<&[CsvRow]>,
    load_time_seconds: f64,
) -> AnalysisResult {
    let aggregate_start = Instant::now();

    let records: Vec<AlertRecord> = alert_sources
        .iter()
        .flat_map(|source| parse_alert_records(&source.data))
        .collect();
    let summary = aggregate(&records);
    let application_insights = telemetry_rows.map(|rows| {
        let mut telemetry = summarize_telemetry(rows);
        telemetry.attach_alerts(&records);
        telemetry
    });

    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    info!(
        files = alert_sources.len(),
        alerts = summary.total_alerts,
        "analysis complete"
    );

    AnalysisResult {
        summary,
        application_insights,
        metadata: AnalysisMetadata {
            generated_at: Utc::now().to_rfc3339(),
            source_files: alert_sources
                .iter()
                .map(|s| s.path.display().to_string())
                .collect(),
            rows_parsed: records.len(),
            load_time_seconds,
            aggregate_time_seconds: aggregate_time,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const ALERTS: &str = "\
Name,Severity,Target resource type,Target resource group,Target resource,Signal type,Alert condition,Fire time
X,Sev1,Microsoft.KeyVault/vaults,rg1,kv-01,Metric,Availability < 99,2024-05-01T10:00:00Z
X,Sev3,Microsoft.KeyVault/vaults,rg1,kv-01,Metric,Availability < 99,2024-05-02T10:00:00Z
X,Sev3,Microsoft.KeyVault/vaults,rg1,kv-01,Metric,Availability < 99,2024-05-03T10:00:00Z
";

    // ── analyze_alert_csv ─────────────────────────────────────────────────────

    #[test]
    fn test_analyze_alert_csv_end_to_end() {
        let summary = analyze_alert_csv(ALERTS);

        assert_eq!(summary.total_alerts, 3);
        assert_eq!(summary.most_common_severity, "Sev3");
        assert_eq!(summary.alert_fatigue_summary.low_priority_total, 2);
        assert_eq!(summary.last_alert_time, "2024-05-03T10:00:00Z");
        assert_eq!(
            summary.resource_health_summary.categories
                [&insights_core::models::ResourceCategory::Security]
                .get("Key Vault"),
            Some(&3)
        );
        assert_eq!(summary.key_insights[3], "Unique alert names: 1");
    }

    #[test]
    fn test_analyze_alert_csv_empty_text() {
        let summary = analyze_alert_csv("");
        assert_eq!(summary.total_alerts, 0);
        assert_eq!(summary.alert_fatigue_summary.low_priority_percentage, 0.0);
    }

    #[test]
    fn test_analyze_alert_csv_header_only() {
        let summary = analyze_alert_csv("Name,Severity\n");
        assert_eq!(summary.total_alerts, 0);
        assert!(summary.top_alert_families.is_empty());
    }

    #[test]
    fn test_reanalysis_is_deterministic() {
        assert_eq!(analyze_alert_csv(ALERTS), analyze_alert_csv(ALERTS));
    }

    // ── analyze_sources ───────────────────────────────────────────────────────

    #[test]
    fn test_analyze_sources_concatenates_files() {
        let sources = vec![
            SourceFile::new("a.csv", ALERTS),
            SourceFile::new("b.csv", "Name,Severity\nY,Sev2\n"),
        ];
        let result = analyze_sources(&sources, None, 0.25);

        assert_eq!(result.summary.total_alerts, 4);
        assert_eq!(result.metadata.rows_parsed, 4);
        assert_eq!(result.metadata.source_files, vec!["a.csv", "b.csv"]);
        assert_eq!(result.metadata.load_time_seconds, 0.25);
        assert!(result.metadata.aggregate_time_seconds >= 0.0);
        assert!(result.application_insights.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&result.metadata.generated_at).is_ok());
    }

    #[test]
    fn test_analyze_sources_with_telemetry() {
        let rows = crate::reader::parse_csv("Name,Location\napp,East US\n");
        let result = analyze_sources(&[], Some(rows.as_slice()), 0.0);

        let telemetry = result.application_insights.expect("telemetry summary");
        assert_eq!(telemetry.total_instances, 1);
        assert_eq!(result.summary.total_alerts, 0);
    }

    #[test]
    fn test_analyze_sources_skips_invalid_utf8_rows() {
        let sources = vec![SourceFile::new(
            "latin1.csv",
            &b"Name,Severity\nGood,Sev1\nCaf\xe9 alert,Sev3\nAlsoGood,Sev2\n"[..],
        )];
        let result = analyze_sources(&sources, None, 0.0);

        assert_eq!(result.summary.total_alerts, 2);
        assert_eq!(result.summary.alert_fatigue_summary.low_priority_total, 0);
    }

    #[test]
    fn test_telemetry_receives_application_insights_alerts() {
        let alerts = "\
Name,Severity,Target resource type,Target resource,Alert condition
Slow,Sev2,microsoft.insights/components,ai-web,Response time > 2s
Disk,Sev1,Microsoft.Compute/virtualMachines,vm-01,Disk > 90
";
        let rows = crate::reader::parse_csv("NAME\nai-web\n");
        let sources = [SourceFile::new("a.csv", alerts)];
        let result = analyze_sources(&sources, Some(rows.as_slice()), 0.0);

        let telemetry = result.application_insights.expect("telemetry summary");
        assert_eq!(telemetry.alerts_configured, 1);
        assert_eq!(telemetry.severity_breakdown.get("Sev2"), Some(&1));
        assert_eq!(telemetry.common_alert_types, vec!["Response time > 2s"]);
    }

    #[test]
    fn test_result_json_omits_missing_telemetry() {
        let result = analyze_sources(&[SourceFile::new("a.csv", ALERTS)], None, 0.0);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("application_insights").is_none());
        assert_eq!(json["summary"]["total_alerts"], 3);
        assert_eq!(json["metadata"]["rows_parsed"], 3);
    }
}
