//! On-demand scan

use anyhow::Result;

use crate::client::ApiClient;
use crate::commands::report::render_report;
use crate::output::{print_info, print_json, print_success, print_warning, OutputFormat};

/// Trigger a scan on the daemon and show its report
pub async fn run_scan(client: &ApiClient, format: OutputFormat) -> Result<()> {
    if let OutputFormat::Table = format {
        print_info("Running scan...");
    }

    let report = client.trigger_scan().await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            if report.is_degraded() {
                print_warning(&format!(
                    "Scan completed with {} warning(s)",
                    report.warnings.len()
                ));
            } else {
                print_success("Scan completed");
            }
            println!();
            print!("{}", render_report(&report));
        }
    }

    Ok(())
}
