//! Markdown and JSON rendering.
//!
//! This module renders the analytics document and inventory reports for
//! the CLI. The HTTP server returns the same structures as JSON.

use super::inventory::InventoryReport;
use crate::models::{Analytics, AnalyticsSummary, MonthCount, NamedCount};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Generate the analytics dashboard as Markdown.
pub fn generate_analytics_markdown(analytics: &Analytics, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str("# Inventory Analytics\n\n");
    output.push_str(&format!(
        "*Generated: {}*\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&generate_summary_section(&analytics.summary));

    let charts = &analytics.charts;
    output.push_str(&generate_named_section(
        "Status Distribution",
        "Status",
        &charts.status_distribution,
    ));
    output.push_str(&generate_named_section(
        "Device Types",
        "Type",
        &charts.device_type_distribution,
    ));
    output.push_str(&generate_named_section(
        "Top Brands",
        "Brand",
        &charts.top_brands,
    ));
    output.push_str(&generate_timeline_section(
        "Purchases by Month",
        &charts.purchase_timeline,
    ));
    output.push_str(&generate_timeline_section(
        "Assignments by Month",
        &charts.assignment_timeline,
    ));
    output.push_str(&generate_named_section(
        "Top Users",
        "User",
        &charts.top_users,
    ));

    output
}

/// Generate the key metrics section.
fn generate_summary_section(summary: &AnalyticsSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("- **Total Devices:** {}\n", summary.total_devices));
    section.push_str(&format!("- **Assigned:** {}\n", summary.assigned_devices));
    section.push_str(&format!("- **Available:** {}\n", summary.available_devices));
    section.push_str(&format!("- **Not Working:** {}\n", summary.not_working_devices));
    section.push_str(&format!("- **Assignment Rate:** {}%\n", summary.assignment_rate));
    section.push_str(&format!(
        "- **Added This Month:** {} (last month: {})\n",
        summary.devices_added_this_month, summary.devices_added_last_month
    ));
    section.push_str(&format!(
        "- **Last 30 Days:** {} added, {} assigned\n",
        summary.recent_activity_count, summary.recent_assignments
    ));
    section.push('\n');

    section
}

/// Generate a two-column section for a categorical chart.
fn generate_named_section(title: &str, label: &str, entries: &[NamedCount]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));

    if entries.is_empty() {
        section.push_str("No data.\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Count |\n", label));
    section.push_str("|:---|:---:|\n");
    for entry in entries {
        section.push_str(&format!("| {} | {} |\n", escape_cell(&entry.name), entry.value));
    }
    section.push('\n');

    section
}

/// Generate a section for a month timeline.
fn generate_timeline_section(title: &str, buckets: &[MonthCount]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    section.push_str("| Month | Count |\n");
    section.push_str("|:---|:---:|\n");
    for bucket in buckets {
        section.push_str(&format!("| {} | {} |\n", bucket.month, bucket.count));
    }
    section.push('\n');

    section
}

/// Generate an inventory report as a Markdown table.
pub fn generate_report_markdown(report: &InventoryReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.title));
    output.push_str(&format!(
        "*Generated: {} | Rows: {}*\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.rows.len()
    ));

    if report.rows.is_empty() {
        output.push_str("No matching devices.\n");
        return output;
    }

    output.push_str(&format!("| {} |\n", report.columns.join(" | ")));
    output.push_str(&format!(
        "|{}\n",
        report.columns.iter().map(|_| ":---|").collect::<String>()
    ));

    for row in &report.rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        output.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    output
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Generate pretty-printed JSON for any output document.
pub fn generate_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::tests::{create_test_device, fixed_now};
    use crate::analysis::compute_analytics;
    use crate::models::Device;
    use crate::report::inventory::{build_report, ReportFilter, ReportKind};

    fn create_test_analytics() -> Analytics {
        let devices = vec![
            Device {
                assigned_to: Some("a@x.com".to_string()),
                ..create_test_device("1", "assigned")
            },
            create_test_device("2", "available"),
        ];
        compute_analytics(&devices, fixed_now())
    }

    #[test]
    fn test_generate_analytics_markdown() {
        let markdown = generate_analytics_markdown(&create_test_analytics(), fixed_now());

        assert!(markdown.contains("# Inventory Analytics"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("- **Total Devices:** 2"));
        assert!(markdown.contains("- **Assignment Rate:** 50%"));
        assert!(markdown.contains("| Oct 2026 | 0 |"));
        assert!(markdown.contains("| a@x.com | 1 |"));
    }

    #[test]
    fn test_empty_chart_section() {
        let section = generate_named_section("Top Users", "User", &[]);
        assert!(section.contains("No data."));
    }

    #[test]
    fn test_generate_report_markdown() {
        let devices = vec![Device {
            notes: None,
            model: Some("XPS | 13".to_string()),
            ..create_test_device("1", "available")
        }];
        let report = build_report(
            ReportKind::Stock,
            &devices,
            &ReportFilter::default(),
            fixed_now(),
            4,
        );

        let markdown = generate_report_markdown(&report);
        assert!(markdown.starts_with("# Devices in Stock Report\n"));
        assert!(markdown.contains("| Asset Number | Device Type |"));
        assert!(markdown.contains("Dell XPS \\| 13"));
        assert!(markdown.contains("Rows: 1"));
    }

    #[test]
    fn test_generate_report_markdown_empty() {
        let report = build_report(
            ReportKind::UserDevices,
            &[],
            &ReportFilter::default(),
            fixed_now(),
            4,
        );
        assert!(generate_report_markdown(&report).contains("No matching devices."));
    }

    #[test]
    fn test_generate_json() {
        let json = generate_json(&create_test_analytics()).unwrap();

        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"charts\""));
        assert!(json.contains("\"assignmentTimeline\""));
    }
}
