use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Label → count mapping that remembers the order in which labels were first seen.
pub type Distribution = IndexMap<String, u64>;

/// Severities counted towards alert fatigue.
pub const LOW_PRIORITY_SEVERITIES: [&str; 2] = ["Sev3", "Sev4"];

/// `true` for the Sev3 / Sev4 tiers.
pub fn is_low_priority(severity: &str) -> bool {
    LOW_PRIORITY_SEVERITIES.contains(&severity)
}

// ── AlertField ────────────────────────────────────────────────────────────────

/// Logical columns of an alert export.
///
/// Portal exports are not consistent about header spelling, so every field
/// carries an ordered list of header aliases and a fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertField {
    Name,
    Severity,
    TargetResourceType,
    TargetResourceGroup,
    TargetResource,
    SignalType,
    AlertCondition,
    FireTime,
}

impl AlertField {
    pub const ALL: [AlertField; 8] = [
        AlertField::Name,
        AlertField::Severity,
        AlertField::TargetResourceType,
        AlertField::TargetResourceGroup,
        AlertField::TargetResource,
        AlertField::SignalType,
        AlertField::AlertCondition,
        AlertField::FireTime,
    ];

    /// Header names tried in order; the first non-empty cell wins.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            AlertField::Name => &["Name"],
            AlertField::Severity => &["Severity"],
            AlertField::TargetResourceType => &["Target resource type", "Target Resource Type"],
            AlertField::TargetResourceGroup => {
                &["Target resource group", "Target Resource Group"]
            }
            AlertField::TargetResource => &[
                "Target resource",
                "Target resource name",
                "Target Resource",
                "Resource",
                "Resource name",
                "Resource Name",
            ],
            AlertField::SignalType => &["Signal type", "Signal Type"],
            AlertField::AlertCondition => &["Alert condition", "Alert Condition"],
            AlertField::FireTime => &["Fire time", "Fire Time"],
        }
    }

    /// Value used when none of the aliases yields a non-empty cell.
    pub fn fallback(self) -> &'static str {
        match self {
            AlertField::Name => "Unnamed Alert",
            AlertField::TargetResourceGroup => "Unknown",
            AlertField::AlertCondition => "Unknown condition",
            _ => "",
        }
    }

    /// Resolve this field against a header lookup.
    pub fn resolve<'a>(self, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
        self.aliases()
            .iter()
            .filter_map(|alias| lookup(alias))
            .find(|value| !value.is_empty())
            .unwrap_or(self.fallback())
            .to_string()
    }
}

// ── AlertRecord ───────────────────────────────────────────────────────────────

/// One row of the alert export with every field resolved to a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Alert rule name, `"Unnamed Alert"` when blank.
    pub name: String,
    /// Usually `Sev0`..`Sev4`, but any string is kept verbatim.
    pub severity: String,
    pub target_resource_type: String,
    /// Resource group, used as the environment proxy.
    pub target_resource_group: String,
    pub target_resource: String,
    pub signal_type: String,
    /// Trimmed condition text, `"Unknown condition"` when blank.
    pub alert_condition: String,
    /// Timestamp string; compared lexicographically, never parsed.
    pub fire_time: String,
}

impl AlertRecord {
    /// Build a record from any header → cell lookup, applying the alias
    /// chains and fallbacks of [`AlertField`].
    pub fn from_lookup<'a>(lookup: impl Fn(&str) -> Option<&'a str> + Copy) -> Self {
        let condition = AlertField::AlertCondition.resolve(lookup);
        let condition = match condition.trim() {
            "" => AlertField::AlertCondition.fallback().to_string(),
            trimmed => trimmed.to_string(),
        };

        Self {
            name: AlertField::Name.resolve(lookup),
            severity: AlertField::Severity.resolve(lookup),
            target_resource_type: AlertField::TargetResourceType.resolve(lookup),
            target_resource_group: AlertField::TargetResourceGroup.resolve(lookup),
            target_resource: AlertField::TargetResource.resolve(lookup),
            signal_type: AlertField::SignalType.resolve(lookup),
            alert_condition: condition,
            fire_time: AlertField::FireTime.resolve(lookup),
        }
    }
}

// ── ResourceCategory ──────────────────────────────────────────────────────────

/// Canonical resource taxonomy used by the resource health view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Compute,
    Networking,
    Storage,
    Databases,
    Analytics,
    Security,
    Integration,
    Configuration,
    Other,
}

impl ResourceCategory {
    /// Every category in display order.
    pub const ALL: [ResourceCategory; 9] = [
        ResourceCategory::Compute,
        ResourceCategory::Networking,
        ResourceCategory::Storage,
        ResourceCategory::Databases,
        ResourceCategory::Analytics,
        ResourceCategory::Security,
        ResourceCategory::Integration,
        ResourceCategory::Configuration,
        ResourceCategory::Other,
    ];

    /// Machine key, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::Compute => "compute",
            ResourceCategory::Networking => "networking",
            ResourceCategory::Storage => "storage",
            ResourceCategory::Databases => "databases",
            ResourceCategory::Analytics => "analytics",
            ResourceCategory::Security => "security",
            ResourceCategory::Integration => "integration",
            ResourceCategory::Configuration => "configuration",
            ResourceCategory::Other => "other",
        }
    }

    /// Heading shown on the dashboard card.
    pub fn label(self) -> &'static str {
        match self {
            ResourceCategory::Compute => "Compute & Workloads",
            ResourceCategory::Networking => "Networking & Connectivity",
            ResourceCategory::Storage => "Storage & Data",
            ResourceCategory::Databases => "Databases & Caching",
            ResourceCategory::Analytics => "Analytics & Monitoring",
            ResourceCategory::Security => "Security & Compliance",
            ResourceCategory::Integration => "Integration & Messaging",
            ResourceCategory::Configuration => "Configuration & Management",
            ResourceCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── DashboardSummary parts ────────────────────────────────────────────────────

/// Share of alerts produced by one signal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTypeShare {
    #[serde(rename = "type")]
    pub signal_type: String,
    pub count: u64,
    pub percentage: f64,
}

/// Alert volume for one resource group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentShare {
    pub environment: String,
    pub total_alerts: u64,
}

/// Per-severity counters for the fixed Sev0..Sev4 tiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMetrics {
    pub total_alerts: u64,
    pub sev0: u64,
    pub sev1: u64,
    pub sev2: u64,
    pub sev3: u64,
    pub sev4: u64,
}

/// Display name → count buckets for each [`ResourceCategory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceHealthSummary {
    pub categories: IndexMap<ResourceCategory, Distribution>,
}

impl Default for ResourceHealthSummary {
    /// All nine categories present, each empty.
    fn default() -> Self {
        Self {
            categories: ResourceCategory::ALL
                .iter()
                .map(|category| (*category, Distribution::new()))
                .collect(),
        }
    }
}

impl ResourceHealthSummary {
    /// Sum of every bucket across all categories.
    pub fn total_resources(&self) -> u64 {
        self.categories
            .values()
            .flat_map(|bucket| bucket.values())
            .sum()
    }
}

/// Firings that share one alert rule name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertFamily {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

/// One frequently used alert condition with its dominant severity and signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub condition: String,
    pub count: u64,
    pub severity: String,
    pub signal_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationSummary {
    pub unique_conditions: u64,
    pub top_conditions: Vec<ConditionSummary>,
}

/// A low-priority rule ranked by how often it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoisyRule {
    pub name: String,
    pub count: u64,
    pub severity: String,
    pub resource_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupNoise {
    pub resource_group: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertFatigueSummary {
    pub low_priority_total: u64,
    pub low_priority_percentage: f64,
    /// Lexicographically greatest non-empty fire time among Sev3/Sev4 alerts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_recent_low_priority: Option<String>,
    pub noisy_rules: Vec<NoisyRule>,
    pub noisiest_resource_groups: Vec<ResourceGroupNoise>,
}

// ── DashboardSummary ──────────────────────────────────────────────────────────

/// Everything the dashboard views bind to.
///
/// Field names are part of the JSON contract with the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_alerts: u64,
    pub unique_alert_names: u64,
    /// Empty when there are no alerts.
    pub most_common_severity: String,
    pub severity_distribution: Distribution,
    pub resource_type_distribution: Distribution,
    pub signal_type_distribution: Vec<SignalTypeShare>,
    pub key_insights: Vec<String>,
    pub alert_metrics: AlertMetrics,
    pub environment_distribution: Vec<EnvironmentShare>,
    pub resource_health_summary: ResourceHealthSummary,
    pub top_alert_families: Vec<AlertFamily>,
    pub configuration_summary: ConfigurationSummary,
    pub alert_fatigue_summary: AlertFatigueSummary,
    /// Lexicographically greatest fire time over all alerts.
    pub last_alert_time: String,
    /// First rows of the export, kept for troubleshooting column mappings.
    pub raw_alerts_sample: Vec<AlertRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
        pairs.iter().copied().collect()
    }

    // ── AlertField ─────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_first_alias_wins() {
        let row = lookup_from(&[("Target resource", "vm-01"), ("Resource", "other")]);
        let value = AlertField::TargetResource.resolve(|k| row.get(k).copied());
        assert_eq!(value, "vm-01");
    }

    #[test]
    fn test_resolve_skips_empty_cells() {
        let row = lookup_from(&[("Target resource", ""), ("Resource name", "kv-prod")]);
        let value = AlertField::TargetResource.resolve(|k| row.get(k).copied());
        assert_eq!(value, "kv-prod");
    }

    #[test]
    fn test_resolve_fallbacks() {
        let row = lookup_from(&[]);
        let get = |k: &str| row.get(k).copied();
        assert_eq!(AlertField::Name.resolve(get), "Unnamed Alert");
        assert_eq!(AlertField::TargetResourceGroup.resolve(get), "Unknown");
        assert_eq!(AlertField::AlertCondition.resolve(get), "Unknown condition");
        assert_eq!(AlertField::Severity.resolve(get), "");
        assert_eq!(AlertField::FireTime.resolve(get), "");
    }

    #[test]
    fn test_every_field_has_aliases() {
        for field in AlertField::ALL {
            assert!(!field.aliases().is_empty(), "{:?} has no aliases", field);
        }
    }

    // ── AlertRecord ────────────────────────────────────────────────────────

    #[test]
    fn test_record_from_full_row() {
        let row = lookup_from(&[
            ("Name", "CPU high"),
            ("Severity", "Sev2"),
            ("Target resource type", "Microsoft.Compute/virtualMachines"),
            ("Target resource group", "rg-prod"),
            ("Target resource", "vm-prod-01"),
            ("Signal type", "Metric"),
            ("Alert condition", "  Percentage CPU > 90  "),
            ("Fire time", "2024-05-01T10:00:00Z"),
        ]);
        let record = AlertRecord::from_lookup(|k| row.get(k).copied());

        assert_eq!(record.name, "CPU high");
        assert_eq!(record.severity, "Sev2");
        assert_eq!(record.target_resource_group, "rg-prod");
        assert_eq!(record.target_resource, "vm-prod-01");
        assert_eq!(record.alert_condition, "Percentage CPU > 90");
        assert_eq!(record.fire_time, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_record_blank_condition_falls_back() {
        let row = lookup_from(&[("Alert condition", "   ")]);
        let record = AlertRecord::from_lookup(|k| row.get(k).copied());
        assert_eq!(record.alert_condition, "Unknown condition");
        assert_eq!(record.name, "Unnamed Alert");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = AlertRecord {
            target_resource_type: "Microsoft.Web/sites".to_string(),
            ..AlertRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["targetResourceType"], "Microsoft.Web/sites");
        assert!(json.get("fireTime").is_some());
    }

    // ── Severity helpers ───────────────────────────────────────────────────

    #[test]
    fn test_is_low_priority() {
        assert!(is_low_priority("Sev3"));
        assert!(is_low_priority("Sev4"));
        assert!(!is_low_priority("Sev2"));
        assert!(!is_low_priority("sev3"));
        assert!(!is_low_priority(""));
    }

    // ── ResourceCategory / ResourceHealthSummary ───────────────────────────

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&ResourceCategory::Databases).unwrap();
        assert_eq!(json, r#""databases""#);
        let back: ResourceCategory = serde_json::from_str(r#""other""#).unwrap();
        assert_eq!(back, ResourceCategory::Other);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ResourceCategory::Compute.label(), "Compute & Workloads");
        assert_eq!(ResourceCategory::Other.label(), "Other");
        assert_eq!(ResourceCategory::Security.to_string(), "security");
    }

    #[test]
    fn test_resource_health_default_has_all_categories_in_order() {
        let health = ResourceHealthSummary::default();
        let keys: Vec<ResourceCategory> = health.categories.keys().copied().collect();
        assert_eq!(keys, ResourceCategory::ALL.to_vec());
        assert_eq!(health.total_resources(), 0);

        let json = serde_json::to_value(&health).unwrap();
        assert!(json["categories"]["configuration"].is_object());
    }

    // ── DashboardSummary ───────────────────────────────────────────────────

    #[test]
    fn test_summary_json_field_names() {
        let summary = DashboardSummary {
            signal_type_distribution: vec![SignalTypeShare {
                signal_type: "Log".to_string(),
                count: 1,
                percentage: 100.0,
            }],
            environment_distribution: vec![EnvironmentShare {
                environment: "rg1".to_string(),
                total_alerts: 1,
            }],
            ..DashboardSummary::default()
        };
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["signal_type_distribution"][0]["type"], "Log");
        assert_eq!(json["environment_distribution"][0]["environment"], "rg1");
        assert_eq!(json["environment_distribution"][0]["total_alerts"], 1);
        assert!(json["alert_fatigue_summary"]
            .get("most_recent_low_priority")
            .is_none());
        assert!(json["configuration_summary"]["top_conditions"].is_array());
    }
}
