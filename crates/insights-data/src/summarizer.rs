//! Plain-language highlights derived from a finished [`DashboardSummary`].

use insights_core::models::DashboardSummary;

use crate::aggregator::ranked;

/// Ordered dashboard highlights: volume, dominant severity, most monitored
/// resource type, distinct rule names and the latest fire time.
pub fn summarize(summary: &DashboardSummary) -> Vec<String> {
    let top_resource_type = ranked(&summary.resource_type_distribution)
        .first()
        .map(|(resource_type, _)| *resource_type)
        .filter(|resource_type| !resource_type.is_empty())
        .unwrap_or("N/A");

    vec![
        format!(
            "{} total alerts configured across your Azure resources",
            summary.total_alerts
        ),
        format!("Most common severity: {}", summary.most_common_severity),
        format!("Most monitored resource type: {}", top_resource_type),
        format!("Unique alert names: {}", summary.unique_alert_names),
        format!("Latest alert fired at: {}", summary.last_alert_time),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::models::Distribution;

    #[test]
    fn test_summarize_populated() {
        let mut resource_types = Distribution::new();
        resource_types.insert("Microsoft.Web/sites".to_string(), 1);
        resource_types.insert("Microsoft.Compute/virtualMachines".to_string(), 4);

        let summary = DashboardSummary {
            total_alerts: 5,
            unique_alert_names: 3,
            most_common_severity: "Sev2".to_string(),
            resource_type_distribution: resource_types,
            last_alert_time: "2024-06-01T12:00:00Z".to_string(),
            ..DashboardSummary::default()
        };

        assert_eq!(
            summarize(&summary),
            vec![
                "5 total alerts configured across your Azure resources",
                "Most common severity: Sev2",
                "Most monitored resource type: Microsoft.Compute/virtualMachines",
                "Unique alert names: 3",
                "Latest alert fired at: 2024-06-01T12:00:00Z",
            ]
        );
    }

    #[test]
    fn test_summarize_empty_summary() {
        let insights = summarize(&DashboardSummary::default());
        assert_eq!(insights.len(), 5);
        assert_eq!(insights[0], "0 total alerts configured across your Azure resources");
        assert_eq!(insights[2], "Most monitored resource type: N/A");
        assert_eq!(insights[4], "Latest alert fired at: ");
    }

    #[test]
    fn test_summarize_blank_top_type_reads_na() {
        let mut resource_types = Distribution::new();
        resource_types.insert(String::new(), 2);
        let summary = DashboardSummary {
            total_alerts: 2,
            resource_type_distribution: resource_types,
            ..DashboardSummary::default()
        };
        assert_eq!(summarize(&summary)[2], "Most monitored resource type: N/A");
    }
}
