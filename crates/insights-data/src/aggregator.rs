//! Single-pass aggregation of alert records into a [`DashboardSummary`].
//!
//! [`AlertAggregator`] owns every running counter for one request. Records are
//! folded into it and [`AlertAggregator::finish`] turns the counters into the
//! immutable summary, so nothing is shared between invocations.

use indexmap::IndexMap;
use insights_core::classifier::classify;
use insights_core::formatting::share_percent;
use insights_core::models::{
    is_low_priority, AlertFamily, AlertFatigueSummary, AlertMetrics, AlertRecord,
    ConditionSummary, ConfigurationSummary, DashboardSummary, Distribution, EnvironmentShare,
    NoisyRule, ResourceGroupNoise, ResourceHealthSummary, SignalTypeShare,
};
use tracing::debug;

use crate::summarizer::summarize;

/// Length of `top_alert_families`.
pub const TOP_ALERT_FAMILIES: usize = 10;
/// Length of `configuration_summary.top_conditions`.
pub const TOP_CONDITIONS: usize = 10;
/// Length of `alert_fatigue_summary.noisy_rules`.
pub const TOP_NOISY_RULES: usize = 5;
/// Length of `alert_fatigue_summary.noisiest_resource_groups`.
pub const TOP_NOISY_GROUPS: usize = 5;
/// Number of records copied into `raw_alerts_sample`.
pub const RAW_SAMPLE_SIZE: usize = 20;

// ── ConditionStat ─────────────────────────────────────────────────────────────

/// Running counters for one alert condition.
#[derive(Debug, Clone, Default)]
pub struct ConditionStat {
    pub count: u64,
    pub severity_counts: Distribution,
    pub signal_type_counts: Distribution,
}

impl ConditionStat {
    fn add_record(&mut self, record: &AlertRecord) {
        self.count += 1;
        bump(&mut self.severity_counts, &record.severity);
        bump(&mut self.signal_type_counts, &record.signal_type);
    }
}

// ── LowPriorityRuleStat ───────────────────────────────────────────────────────

/// Running counters for one alert rule, Sev3/Sev4 firings only.
#[derive(Debug, Clone, Default)]
pub struct LowPriorityRuleStat {
    pub count: u64,
    pub severity_counts: Distribution,
    pub resource_group_counts: Distribution,
}

impl LowPriorityRuleStat {
    fn add_record(&mut self, record: &AlertRecord) {
        self.count += 1;
        bump(&mut self.severity_counts, &record.severity);
        bump(&mut self.resource_group_counts, &record.target_resource_group);
    }
}

// ── AlertAggregator ───────────────────────────────────────────────────────────

/// Accumulator for one aggregation pass.
#[derive(Debug, Default)]
pub struct AlertAggregator {
    total_alerts: u64,
    severities: Distribution,
    resource_types: Distribution,
    signal_types: Distribution,
    environments: Distribution,
    /// Doubles as the unique-name set.
    alert_names: Distribution,
    conditions: IndexMap<String, ConditionStat>,
    low_priority_total: u64,
    low_priority_rules: IndexMap<String, LowPriorityRuleStat>,
    low_priority_groups: Distribution,
    last_alert_time: String,
    last_low_priority_fire: String,
    resource_health: ResourceHealthSummary,
    sample: Vec<AlertRecord>,
}

impl AlertAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into every running counter.
    pub fn add_record(&mut self, record: &AlertRecord) {
        self.total_alerts += 1;

        bump(&mut self.severities, &record.severity);
        bump(&mut self.resource_types, &record.target_resource_type);
        bump(&mut self.signal_types, &record.signal_type);
        bump(&mut self.environments, &record.target_resource_group);
        bump(&mut self.alert_names, &record.name);

        self.conditions
            .entry(record.alert_condition.clone())
            .or_default()
            .add_record(record);

        if is_low_priority(&record.severity) {
            self.low_priority_total += 1;
            self.low_priority_rules
                .entry(record.name.clone())
                .or_default()
                .add_record(record);
            bump(&mut self.low_priority_groups, &record.target_resource_group);

            // String comparison on purpose: fire times are never parsed.
            if !record.fire_time.is_empty() && record.fire_time > self.last_low_priority_fire {
                self.last_low_priority_fire = record.fire_time.clone();
            }
        }

        if record.fire_time > self.last_alert_time {
            self.last_alert_time = record.fire_time.clone();
        }

        let classification = classify(&record.target_resource_type, &record.target_resource);
        if let Some(bucket) = self
            .resource_health
            .categories
            .get_mut(&classification.category)
        {
            bump(bucket, &classification.display_name);
        }

        if self.sample.len() < RAW_SAMPLE_SIZE {
            self.sample.push(record.clone());
        }
    }

    /// Derive rankings and percentages and freeze the result.
    pub fn finish(self) -> DashboardSummary {
        let total = self.total_alerts;

        let most_common_severity = dominant(&self.severities).unwrap_or_default().to_string();

        let signal_type_distribution = self
            .signal_types
            .iter()
            .map(|(signal_type, &count)| SignalTypeShare {
                signal_type: signal_type.clone(),
                count,
                percentage: share_percent(count, total),
            })
            .collect();

        let environment_distribution = self
            .environments
            .iter()
            .map(|(environment, &total_alerts)| EnvironmentShare {
                environment: environment.clone(),
                total_alerts,
            })
            .collect();

        let top_alert_families = ranked(&self.alert_names)
            .into_iter()
            .take(TOP_ALERT_FAMILIES)
            .map(|(name, count)| AlertFamily {
                name: name.to_string(),
                count,
                percentage: share_percent(count, total),
            })
            .collect();

        let configuration_summary = ConfigurationSummary {
            unique_conditions: self.conditions.len() as u64,
            top_conditions: ranked_by(&self.conditions, |s| s.count)
                .into_iter()
                .take(TOP_CONDITIONS)
                .map(|(condition, stat)| ConditionSummary {
                    condition: condition.to_string(),
                    count: stat.count,
                    severity: dominant(&stat.severity_counts)
                        .unwrap_or("Unknown")
                        .to_string(),
                    signal_type: dominant(&stat.signal_type_counts)
                        .unwrap_or("Unknown")
                        .to_string(),
                })
                .collect(),
        };

        let alert_fatigue_summary = AlertFatigueSummary {
            low_priority_total: self.low_priority_total,
            low_priority_percentage: share_percent(self.low_priority_total, total),
            most_recent_low_priority: Some(self.last_low_priority_fire)
                .filter(|fire| !fire.is_empty()),
            noisy_rules: ranked_by(&self.low_priority_rules, |s| s.count)
                .into_iter()
                .take(TOP_NOISY_RULES)
                .map(|(name, stat)| NoisyRule {
                    name: name.to_string(),
                    count: stat.count,
                    severity: dominant(&stat.severity_counts).unwrap_or("Sev3").to_string(),
                    resource_group: dominant(&stat.resource_group_counts)
                        .unwrap_or("Unknown")
                        .to_string(),
                })
                .collect(),
            noisiest_resource_groups: ranked(&self.low_priority_groups)
                .into_iter()
                .take(TOP_NOISY_GROUPS)
                .map(|(group, count)| ResourceGroupNoise {
                    resource_group: group.to_string(),
                    count,
                })
                .collect(),
        };

        let alert_metrics = AlertMetrics {
            total_alerts: total,
            sev0: count_of(&self.severities, "Sev0"),
            sev1: count_of(&self.severities, "Sev1"),
            sev2: count_of(&self.severities, "Sev2"),
            sev3: count_of(&self.severities, "Sev3"),
            sev4: count_of(&self.severities, "Sev4"),
        };

        debug!(
            total_alerts = total,
            unique_names = self.alert_names.len(),
            unique_conditions = self.conditions.len(),
            low_priority = self.low_priority_total,
            "alert aggregation finished"
        );

        let mut summary = DashboardSummary {
            total_alerts: total,
            unique_alert_names: self.alert_names.len() as u64,
            most_common_severity,
            severity_distribution: self.severities,
            resource_type_distribution: self.resource_types,
            signal_type_distribution,
            key_insights: Vec::new(),
            alert_metrics,
            environment_distribution,
            resource_health_summary: self.resource_health,
            top_alert_families,
            configuration_summary,
            alert_fatigue_summary,
            last_alert_time: self.last_alert_time,
            raw_alerts_sample: self.sample,
        };
        summary.key_insights = summarize(&summary);
        summary
    }
}

/// Aggregate `records` into a fresh [`DashboardSummary`].
pub fn aggregate(records: &[AlertRecord]) -> DashboardSummary {
    records
        .iter()
        .fold(AlertAggregator::new(), |mut acc, record| {
            acc.add_record(record);
            acc
        })
        .finish()
}

// ── Ranking helpers ───────────────────────────────────────────────────────────

/// Entries sorted by count, descending. Equal counts keep first-seen order.
pub fn ranked(map: &Distribution) -> Vec<(&str, u64)> {
    ranked_by(map, |count| *count)
        .into_iter()
        .map(|(key, count)| (key, *count))
        .collect()
}

/// Entries sorted by `count_fn`, descending, stable for ties.
pub fn ranked_by<V>(map: &IndexMap<String, V>, count_fn: impl Fn(&V) -> u64) -> Vec<(&str, &V)> {
    let mut entries: Vec<(&str, &V)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_by(|a, b| count_fn(b.1).cmp(&count_fn(a.1)));
    entries
}

/// Key with the highest count; the first one seen wins a tie.
pub fn dominant(map: &Distribution) -> Option<&str> {
    let mut best: Option<(&str, u64)> = None;
    for (key, &count) in map {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key.as_str(), count)),
        }
    }
    best.map(|(key, _)| key)
}

fn bump(map: &mut Distribution, key: &str) {
    match map.get_mut(key) {
        Some(count) => *count += 1,
        None => {
            map.insert(key.to_string(), 1);
        }
    }
}

fn count_of(map: &Distribution, key: &str) -> u64 {
    map.get(key).copied().unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
