//! Output rendering for the command-line report.

use std::fmt::Write;

use insights_core::formatting::{format_count, format_percent, truncate};
use insights_data::analysis::AnalysisResult;

/// Longest alert name shown in the text digest.
const NAME_WIDTH: usize = 48;

/// Width of the widest category heading.
const LABEL_WIDTH: usize = 26;

/// Pretty-printed JSON of the whole result.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Human-readable digest: key insights, top alert families, resource health by
/// category, a fatigue line and, when present, a telemetry line.
pub fn render_text(result: &AnalysisResult) -> String {
    let summary = &result.summary;
    let mut out = String::new();

    out.push_str("Key insights\n");
    for insight in &summary.key_insights {
        let _ = writeln!(out, "  - {}", insight);
    }

    if !summary.top_alert_families.is_empty() {
        out.push_str("\nTop alert families\n");
        for family in &summary.top_alert_families {
            let _ = writeln!(
                out,
                "  {:<width$} {:>8} {:>7}",
                truncate(&family.name, NAME_WIDTH),
                format_count(family.count),
                format_percent(family.percentage),
                width = NAME_WIDTH
            );
        }
    }

    let health = &summary.resource_health_summary;
    if health.total_resources() > 0 {
        out.push_str("\nResource health\n");
        for (category, resources) in health.categories.iter().filter(|(_, r)| !r.is_empty()) {
            let _ = writeln!(
                out,
                "  {:<width$} {:>4} resources {:>8} alerts",
                category.label(),
                resources.len(),
                format_count(resources.values().sum::<u64>()),
                width = LABEL_WIDTH
            );
        }
    }

    let fatigue = &summary.alert_fatigue_summary;
    let _ = writeln!(
        out,
        "\nAlert fatigue: {} low-priority alerts ({})",
        format_count(fatigue.low_priority_total),
        format_percent(fatigue.low_priority_percentage)
    );
    if let Some(rule) = fatigue.noisy_rules.first() {
        let _ = writeln!(
            out,
            "  noisiest rule: {} ({} in {})",
            rule.name,
            format_count(rule.count),
            rule.resource_group
        );
    }

    if let Some(telemetry) = &result.application_insights {
        let _ = writeln!(
            out,
            "\n{}: {} instances across {} regions",
            telemetry.resource_type,
            format_count(telemetry.total_instances),
            telemetry.regions.len()
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_data::analysis::{analyze_sources, SourceFile};
    use insights_data::reader::parse_csv;

    const ALERTS: &str = "\
Name,Severity,Target resource group
X,Sev1,rg1
X,Sev3,rg1
X,Sev3,rg1
";

    fn sample_result() -> AnalysisResult {
        analyze_sources(&[SourceFile::new("alerts.csv", ALERTS)], None, 0.0)
    }

    #[test]
    fn test_render_text_sections() {
        let text = render_text(&sample_result());

        assert!(text.starts_with("Key insights\n"));
        assert!(text.contains("  - 3 total alerts configured across your Azure resources"));
        assert!(text.contains("Top alert families"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("Alert fatigue: 2 low-priority alerts (66.7%)"));
        assert!(text.contains("noisiest rule: X (2 in rg1)"));
        assert!(!text.contains("instances across"));
    }

    #[test]
    fn test_render_text_resource_health_uses_category_labels() {
        let csv = "\
Name,Severity,Target resource type,Target resource
cpu,Sev2,Microsoft.Compute/virtualMachines,vm-01
cpu,Sev2,Microsoft.Compute/virtualMachines,vm-02
lb,Sev1,Microsoft.Network/loadBalancers,lb-edge
";
        let result = analyze_sources(&[SourceFile::new("alerts.csv", csv)], None, 0.0);
        let text = render_text(&result);

        assert!(text.contains("\nResource health\n"));
        assert!(text.contains("  Compute & Workloads "));
        assert!(text.contains("  Networking & Connectivity "));
        assert!(!text.contains("Storage & Data"));
        assert!(!text.contains("  compute "));
    }

    #[test]
    fn test_render_text_skips_resource_health_without_alerts() {
        let result = analyze_sources(&[], None, 0.0);
        assert!(!render_text(&result).contains("Resource health"));
    }

    #[test]
    fn test_render_text_with_telemetry() {
        let rows = parse_csv("NAME,LOCATION\nweb,East US\napi,East US\n");
        let result = analyze_sources(&[], Some(rows.as_slice()), 0.0);
        let text = render_text(&result);

        assert!(text.contains("Application Insights: 2 instances across 1 regions"));
        assert!(!text.contains("Top alert families"));
        assert!(!text.contains("noisiest rule"));
    }

    #[test]
    fn test_render_json_round_trips_field_names() {
        let json = render_json(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["total_alerts"], 3);
        assert_eq!(value["summary"]["alert_fatigue_summary"]["low_priority_total"], 2);
        assert_eq!(value["metadata"]["source_files"][0], "alerts.csv");
        assert!(json.contains('\n'));
    }
}
