//! Cost Scanner CLI
//!
//! A command-line tool for viewing waste reports, browsing scan history
//! and triggering scans on a running cost-scanner daemon.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{history, report, scan};

/// Default number of history entries shown
const DEFAULT_HISTORY_LIMIT: usize = 7;

/// Cost Scanner CLI
#[derive(Parser)]
#[command(name = "csc")]
#[command(author, version, about = "CLI for the Cost Scanner", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via CSC_API_URL env var)
    #[arg(long, env = "CSC_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, value_enum)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the latest waste report
    Report,

    /// Show recent scan totals, newest first
    History {
        /// Number of scans to show
        #[arg(long, short, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Run a scan now and show its report
    Scan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::CliConfig::load()?;

    let api_url = config.resolve_api_url(cli.api_url);
    let format = cli.format.or(config.default_format).unwrap_or_default();
    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Report => report::show_report(&client, format).await?,
        Commands::History { limit } => history::show_history(&client, limit, format).await?,
        Commands::Scan => scan::run_scan(&client, format).await?,
    }

    Ok(())
}
