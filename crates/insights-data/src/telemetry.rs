//! Application telemetry exports: instance inventory plus summed request
//! metrics across every numbered part of the export.

use std::path::PathBuf;

use insights_core::classifier::display_name;
use insights_core::models::{AlertRecord, Distribution};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::ranked;
use crate::reader::{numbered_part_paths, CsvRow};

/// Resource type reported for every telemetry summary.
pub const APPLICATION_INSIGHTS: &str = "Application Insights";

/// Length of `common_alert_types`.
pub const COMMON_ALERT_TYPES: usize = 5;

const NAME_ALIASES: &[&str] = &[
    "Name",
    "NAME",
    "Resource name",
    "componentName",
    "component",
    "Component",
];
const RESOURCE_GROUP_ALIASES: &[&str] = &[
    "Resource group",
    "Resource Group",
    "RESOURCE GROUP",
    "resourceGroup",
];
const LOCATION_ALIASES: &[&str] = &["Location", "LOCATION", "location"];
const SUBSCRIPTION_ALIASES: &[&str] = &["Subscription", "SUBSCRIPTION", "subscription"];

const TOTAL_REQUESTS_ALIASES: &[&str] = &[
    "total_requests",
    "Total Requests",
    "TotalRequests",
    "totalRequests",
];
const FAILED_REQUESTS_ALIASES: &[&str] = &["failed_requests", "Failed Requests", "failedRequests"];
const RESPONSE_TIME_ALIASES: &[&str] = &[
    "avg_response_time_ms",
    "Avg Response Time (ms)",
    "avgResponseTimeMs",
];
const AVAILABILITY_ALIASES: &[&str] = &["availability_percent", "Availability"];
const PAGE_VIEWS_ALIASES: &[&str] = &["page_views", "Page Views"];
const ACTIVE_USERS_ALIASES: &[&str] = &["active_users", "Active Users"];

// ── Models ────────────────────────────────────────────────────────────────────

/// One monitored application component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryInstance {
    pub name: String,
    pub resource_group: String,
    pub location: String,
    pub subscription: String,
}

impl TelemetryInstance {
    fn from_row(row: &CsvRow) -> Self {
        let cell = |aliases: &[&str]| row.first_present(aliases).unwrap_or("").to_string();
        Self {
            name: cell(NAME_ALIASES),
            resource_group: cell(RESOURCE_GROUP_ALIASES),
            location: cell(LOCATION_ALIASES),
            subscription: cell(SUBSCRIPTION_ALIASES),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryMetrics {
    pub total_requests: f64,
    pub failed_requests: f64,
    /// Mean over rows reporting a positive value.
    pub avg_response_time_ms: f64,
    /// Mean over rows reporting a positive value.
    pub availability_percent: f64,
    pub active_users: f64,
    pub page_views: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInsightsSummary {
    pub resource_type: String,
    pub total_instances: u64,
    pub instances: Vec<TelemetryInstance>,
    pub metrics: TelemetryMetrics,
    /// Alerts whose target resource displays as Application Insights.
    pub alerts_configured: u64,
    pub severity_breakdown: Distribution,
    /// Most frequent alert conditions on those alerts.
    pub common_alert_types: Vec<String>,
    pub regions: Vec<String>,
    pub subscriptions: Vec<String>,
    pub location_distribution: Distribution,
    pub subscription_distribution: Distribution,
    pub resource_group_distribution: Distribution,
}

impl Default for ApplicationInsightsSummary {
    fn default() -> Self {
        Self {
            resource_type: APPLICATION_INSIGHTS.to_string(),
            total_instances: 0,
            instances: Vec::new(),
            metrics: TelemetryMetrics::default(),
            alerts_configured: 0,
            severity_breakdown: Distribution::new(),
            common_alert_types: Vec::new(),
            regions: Vec::new(),
            subscriptions: Vec::new(),
            location_distribution: Distribution::new(),
            subscription_distribution: Distribution::new(),
            resource_group_distribution: Distribution::new(),
        }
    }
}

impl ApplicationInsightsSummary {
    /// Fill the alert fields from the alert records of the same fetch.
    pub fn attach_alerts(&mut self, records: &[AlertRecord]) {
        let mut conditions = Distribution::new();
        self.alerts_configured = 0;
        self.severity_breakdown.clear();

        for record in records.iter().filter(|r| {
            display_name(&r.target_resource_type, &r.target_resource) == APPLICATION_INSIGHTS
        }) {
            self.alerts_configured += 1;
            *self
                .severity_breakdown
                .entry(record.severity.clone())
                .or_insert(0) += 1;
            *conditions.entry(record.alert_condition.clone()).or_insert(0) += 1;
        }

        self.common_alert_types = ranked(&conditions)
            .into_iter()
            .take(COMMON_ALERT_TYPES)
            .map(|(condition, _)| condition.to_string())
            .collect();
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Running sum and count of positive samples.
#[derive(Debug, Default)]
struct PositiveMean {
    sum: f64,
    count: u64,
}

impl PositiveMean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| *v > 0.0) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Summarize telemetry rows from every export part.
pub fn summarize_telemetry(rows: &[CsvRow]) -> ApplicationInsightsSummary {
    let mut summary = ApplicationInsightsSummary::default();
    let mut response_time = PositiveMean::default();
    let mut availability = PositiveMean::default();

    for row in rows {
        let instance = TelemetryInstance::from_row(row);

        push_unique(&mut summary.regions, &instance.location);
        push_unique(&mut summary.subscriptions, &instance.subscription);

        if !instance.name.is_empty() {
            bump(&mut summary.location_distribution, &instance.location);
            bump(&mut summary.subscription_distribution, &instance.subscription);
            bump(&mut summary.resource_group_distribution, &instance.resource_group);
        }

        let metrics = &mut summary.metrics;
        metrics.total_requests += numeric(row, TOTAL_REQUESTS_ALIASES).unwrap_or(0.0);
        metrics.failed_requests += numeric(row, FAILED_REQUESTS_ALIASES).unwrap_or(0.0);
        metrics.page_views += numeric(row, PAGE_VIEWS_ALIASES).unwrap_or(0.0);
        metrics.active_users += numeric(row, ACTIVE_USERS_ALIASES).unwrap_or(0.0);
        response_time.add(numeric(row, RESPONSE_TIME_ALIASES));
        availability.add(numeric(row, AVAILABILITY_ALIASES));

        summary.instances.push(instance);
    }

    summary.total_instances = summary.instances.len() as u64;
    summary.metrics.avg_response_time_ms = response_time.mean();
    summary.metrics.availability_percent = availability.mean();

    debug!(
        instances = summary.total_instances,
        regions = summary.regions.len(),
        "telemetry summarized"
    );
    summary
}

// ── TelemetrySource ───────────────────────────────────────────────────────────

/// Location of a numbered telemetry export set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySource {
    pub dir: PathBuf,
    pub stem: String,
    pub parts: u32,
}

impl TelemetrySource {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, parts: u32) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            parts,
        }
    }

    /// `<stem>.csv`, `<stem> (1).csv`, … inside `dir`.
    pub fn part_paths(&self) -> Vec<PathBuf> {
        numbered_part_paths(&self.dir, &self.stem, self.parts)
    }
}

fn numeric(row: &CsvRow, aliases: &[&str]) -> Option<f64> {
    row.first_present(aliases)
        .and_then(|cell| cell.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn bump(map: &mut Distribution, key: &str) {
    let key = if key.is_empty() { "Unknown" } else { key };
    *map.entry(key.to_string()).or_insert(0) += 1;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
