//! Heuristic mapping of free-text resource types and names onto the
//! [`ResourceCategory`] taxonomy and onto friendly display names.
//!
//! Both lookups are ordered tables evaluated first-match-wins, so a string that
//! matches several rows always lands on the earliest one.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ResourceCategory;

/// Display name used when neither the resource name nor its type is known.
pub const UNKNOWN_RESOURCE: &str = "Unknown resource";

/// Category patterns in precedence order. Matched against the lower-cased
/// `"<type> <name>"` string.
pub const CATEGORY_RULES: &[(ResourceCategory, &str)] = &[
    (
        ResourceCategory::Compute,
        r"virtual|vm|virtualmachine|kubernetes|aks|container|app service|appservice|webapp",
    ),
    (
        ResourceCategory::Networking,
        r"network|gateway|load balancer|loadbalancer|application gateway|vnet|expressroute|cdn",
    ),
    (
        ResourceCategory::Storage,
        r"storage|blob|file share|data lake|disk|files",
    ),
    (
        ResourceCategory::Databases,
        r"sql|cosmos|database|postgres|mysql|redis|caching",
    ),
    (
        ResourceCategory::Analytics,
        r"insights|log analytics|application insights|monitor|analytics|loganalytics",
    ),
    (
        ResourceCategory::Security,
        r"key vault|keyvault|vault|security|policy|sentinel|defender",
    ),
    (
        ResourceCategory::Integration,
        r"service bus|event hub|eventhub|queue|servicebus|integration|logic app|service fabric",
    ),
    (
        ResourceCategory::Configuration,
        r"configuration|app configuration|automation|runbook|policy",
    ),
];

/// One friendly-name rule: a pattern over the lower-cased resource type, a
/// pattern over the lower-cased resource name, and the label either selects.
#[derive(Debug, Clone, Copy)]
pub struct DisplayRule {
    pub type_pattern: &'static str,
    pub name_pattern: &'static str,
    pub label: &'static str,
}

pub const DISPLAY_RULES: &[DisplayRule] = &[
    DisplayRule {
        type_pattern: r"insights|application insights|microsoft\.insights/components",
        name_pattern: r"app insights",
        label: "Application Insights",
    },
    DisplayRule {
        type_pattern: r"virtualmachines|microsoft\.compute/virtualmachines|virtual machine|vm",
        name_pattern: r"virtual machine",
        label: "Virtual Machine",
    },
    DisplayRule {
        type_pattern: r"webapps|appservice|microsoft\.web/sites|app service",
        name_pattern: r"app service|web app",
        label: "App Service",
    },
    DisplayRule {
        type_pattern: r"storageaccounts|microsoft\.storage/storageaccounts|blob|storage account",
        name_pattern: r"storage account",
        label: "Storage Account",
    },
    DisplayRule {
        type_pattern: r"microsoft\.servicebus|service bus|servicebus|queue",
        name_pattern: r"service bus",
        label: "Service Bus Namespace",
    },
    DisplayRule {
        type_pattern: r"cosmosdb|microsoft\.documentdb|cosmos",
        name_pattern: r"cosmos",
        label: "Cosmos DB",
    },
    DisplayRule {
        type_pattern: r"keyvault|microsoft\.keyvault",
        name_pattern: r"key vault",
        label: "Key Vault",
    },
    DisplayRule {
        type_pattern: r"loganalytics|log analytics workspace|microsoft\.operationalinsights",
        name_pattern: r"log analytics",
        label: "Log Analytics Workspace",
    },
    DisplayRule {
        type_pattern: r"sqlservers|microsoft\.sql",
        name_pattern: r"sql server|sql database",
        label: "SQL Database",
    },
    DisplayRule {
        type_pattern: r"eventhub|event hubs|microsoft\.eventhub",
        name_pattern: r"event hub",
        label: "Event Hub",
    },
    DisplayRule {
        type_pattern: r"loadbalancer|load balancer",
        name_pattern: r"load balancer",
        label: "Load Balancer",
    },
    DisplayRule {
        type_pattern: r"applicationgateway|application gateway",
        name_pattern: r"application gateway",
        label: "Application Gateway",
    },
    DisplayRule {
        type_pattern: r"vnet|virtual network",
        name_pattern: r"vnet",
        label: "Virtual Network",
    },
];

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: ResourceCategory,
    pub display_name: String,
}

/// Classify a resource into a category and a display name.
///
/// # Examples
///
/// ```
/// use insights_core::classifier::classify;
/// use insights_core::models::ResourceCategory;
///
/// let c = classify("Microsoft.KeyVault/vaults", "kv-prod");
/// assert_eq!(c.category, ResourceCategory::Security);
/// assert_eq!(c.display_name, "Key Vault");
///
/// let unknown = classify("", "");
/// assert_eq!(unknown.category, ResourceCategory::Other);
/// assert_eq!(unknown.display_name, "Unknown resource");
/// ```
pub fn classify(resource_type: &str, resource_name: &str) -> Classification {
    Classification {
        category: detect_category(resource_type, resource_name),
        display_name: display_name(resource_type, resource_name),
    }
}

/// First category whose pattern matches `"<type> <name>"`, else `Other`.
pub fn detect_category(resource_type: &str, resource_name: &str) -> ResourceCategory {
    let key = format!("{} {}", resource_type, resource_name).to_lowercase();

    category_table()
        .iter()
        .find(|(_, re)| re.is_match(&key))
        .map(|(category, _)| *category)
        .unwrap_or(ResourceCategory::Other)
}

/// Friendly label for a known resource kind, otherwise the raw name, the raw
/// type, or [`UNKNOWN_RESOURCE`], in that order.
pub fn display_name(resource_type: &str, resource_name: &str) -> String {
    let rt = resource_type.to_lowercase();
    let rn = resource_name.to_lowercase();

    if let Some((label, _, _)) = display_table()
        .iter()
        .find(|(_, type_re, name_re)| type_re.is_match(&rt) || name_re.is_match(&rn))
    {
        return (*label).to_string();
    }

    if !resource_name.is_empty() {
        resource_name.to_string()
    } else if !resource_type.is_empty() {
        resource_type.to_string()
    } else {
        UNKNOWN_RESOURCE.to_string()
    }
}

// ── Compiled tables ───────────────────────────────────────────────────────────

fn category_table() -> &'static [(ResourceCategory, Regex)] {
    static TABLE: OnceLock<Vec<(ResourceCategory, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        CATEGORY_RULES
            .iter()
            .map(|(category, pattern)| (*category, Regex::new(pattern).expect("regex is valid")))
            .collect()
    })
}

fn display_table() -> &'static [(&'static str, Regex, Regex)] {
    static TABLE: OnceLock<Vec<(&'static str, Regex, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        DISPLAY_RULES
            .iter()
            .map(|rule| {
                (
                    rule.label,
                    Regex::new(rule.type_pattern).expect("regex is valid"),
                    Regex::new(rule.name_pattern).expect("regex is valid"),
                )
            })
            .collect()
    })
}
