//! Latest waste report

use anyhow::Result;
use colored::Colorize;
use scanner_lib::{FindingDetails, ResourceType, ScanReport};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    format_currency, format_percent, format_trend, print_info, print_json, table, OutputFormat,
};

#[derive(Tabled)]
struct VolumeRow {
    #[tabled(rename = "Volume ID")]
    id: String,
    #[tabled(rename = "Type")]
    volume_type: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Monthly Waste")]
    cost: String,
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Instance ID")]
    id: String,
    #[tabled(rename = "Type")]
    instance_type: String,
    #[tabled(rename = "Avg CPU")]
    utilization: String,
    #[tabled(rename = "Monthly Waste")]
    cost: String,
}

/// Show the latest report
pub async fn show_report(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let Some(report) = client.latest_report().await? else {
        print_info("No scan has completed yet. Run `csc scan` to start one.");
        return Ok(());
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print!("{}", render_report(&report)),
    }

    Ok(())
}

/// Plain-text rendering of a report
pub fn render_report(report: &ScanReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        format!("Cost Scanner Report - {}", summary.scan_date).bold()
    ));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!(
        "Total Monthly Savings Potential: {}\n",
        format_currency(summary.total_monthly_savings).green().bold()
    ));
    out.push_str(&format!(
        "Found {} resources that could be optimized.\n\n",
        summary.findings.len()
    ));

    let volumes: Vec<VolumeRow> = summary
        .findings
        .iter()
        .filter_map(|f| match &f.details {
            FindingDetails::Volume {
                size_gb,
                volume_type,
                created_at,
            } => Some(VolumeRow {
                id: f.resource_id.clone(),
                volume_type: volume_type.clone(),
                size: format!("{} GB", size_gb),
                created: created_at.format("%Y-%m-%d").to_string(),
                cost: format_currency(f.monthly_cost),
            }),
            FindingDetails::Instance { .. } => None,
        })
        .collect();

    let instances: Vec<InstanceRow> = summary
        .findings
        .iter()
        .filter_map(|f| match &f.details {
            FindingDetails::Instance {
                name,
                instance_type,
                avg_utilization_percent,
            } => Some(InstanceRow {
                name: name.clone(),
                id: f.resource_id.clone(),
                instance_type: instance_type.clone(),
                utilization: format_percent(*avg_utilization_percent),
                cost: format_currency(f.monthly_cost),
            }),
            FindingDetails::Volume { .. } => None,
        })
        .collect();

    if !volumes.is_empty() {
        out.push_str(&format!(
            "{} ({})\n",
            "Unattached Volumes".bold(),
            format_currency(summary.waste_of(ResourceType::Volume))
        ));
        out.push_str(&format!("{}\n\n", table(volumes)));
    }

    if !instances.is_empty() {
        out.push_str(&format!(
            "{} ({})\n",
            "Idle Instances".bold(),
            format_currency(summary.waste_of(ResourceType::Instance))
        ));
        out.push_str(&format!("{}\n\n", table(instances)));
    }

    out.push_str(&format!("{}\n", "Day-Over-Day Trend".bold()));
    out.push_str(&format!("{}\n", "-".repeat(50)));
    if let Some(previous) = report.trend.previous_total {
        out.push_str(&format!("Previous: {}/month\n", format_currency(previous)));
        out.push_str(&format!(
            "Today:    {}/month\n",
            format_currency(report.trend.current_total)
        ));
    }
    out.push_str(&format!("{}\n\n", format_trend(&report.trend)));

    if summary.findings.is_empty() {
        out.push_str(&format!("{}\n", "✓ Everything looks optimized!".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "Recommended Actions:".bold()));
        out.push_str("  - Snapshot and delete unattached volumes.\n");
        out.push_str("  - Rightsize or stop idle instances.\n");
    }

    if !report.warnings.is_empty() {
        out.push_str(&format!("\n{}\n", "Warnings".yellow().bold()));
        for warning in &report.warnings {
            out.push_str(&format!("  ⚠ {}\n", warning));
        }
    }

    out
}
