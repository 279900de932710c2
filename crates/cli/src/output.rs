//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use rust_decimal::Decimal;
use scanner_lib::{TrendDirection, TrendResult};
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any response as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render rows as a rounded table
pub fn table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a monthly amount in dollars
pub fn format_currency(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

/// Utilization percent, at the same two digits findings are rounded to
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// One-line description of a trend, colored by direction
pub fn format_trend(trend: &TrendResult) -> String {
    let change = format!(
        "{} ({:.2}%)",
        format_currency(trend.delta.abs()),
        trend.delta_percent.abs()
    );

    match trend.direction() {
        TrendDirection::Improved => format!("↓ Improved by {}", change).green().to_string(),
        TrendDirection::Increased => format!("↑ Increased by {}", change).red().to_string(),
        TrendDirection::Unchanged => "→ Unchanged".to_string(),
        TrendDirection::NoHistory => "No previous scan to compare against".dimmed().to_string(),
    }
}
