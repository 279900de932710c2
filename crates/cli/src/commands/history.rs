//! Scan history

use anyhow::Result;
use colored::Colorize;
use scanner_lib::{ScanSummary, TrendDirection, TrendResult};
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{format_currency, print_info, print_json, table, OutputFormat};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Volumes")]
    volumes: usize,
    #[tabled(rename = "Instances")]
    instances: usize,
    #[tabled(rename = "Monthly Waste")]
    total: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Show recent scans, newest first
pub async fn show_history(client: &ApiClient, limit: usize, format: OutputFormat) -> Result<()> {
    let history = client.history(limit).await?;

    match format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table if history.is_empty() => print_info("No scans recorded yet"),
        OutputFormat::Table => println!("{}", render_history(&history)),
    }

    Ok(())
}

/// Table of summaries, each compared with the next older one
pub fn render_history(history: &[ScanSummary]) -> String {
    let rows: Vec<HistoryRow> = history
        .iter()
        .enumerate()
        .map(|(i, summary)| {
            let previous = history.get(i + 1).map(|s| s.total_monthly_savings);
            HistoryRow {
                date: summary.scan_date.to_string(),
                volumes: summary.volume_count(),
                instances: summary.instance_count(),
                total: format_currency(summary.total_monthly_savings),
                change: format_change(&TrendResult::new(summary.total_monthly_savings, previous)),
            }
        })
        .collect();

    table(rows)
}

fn format_change(trend: &TrendResult) -> String {
    match trend.direction() {
        TrendDirection::Improved => format!("-{}", format_currency(trend.delta.abs()))
            .green()
            .to_string(),
        TrendDirection::Increased => format!("+{}", format_currency(trend.delta))
            .red()
            .to_string(),
        TrendDirection::Unchanged => "=".to_string(),
        TrendDirection::NoHistory => "-".to_string(),
    }
}
