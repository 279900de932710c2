//! Scanner daemon configuration

use anyhow::{Context, Result};
use scanner_lib::policy::{PricingConfig, ScanPolicy};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_ENV: &str = "SCANNER_CONFIG";

/// Daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Account label attached to logs
    #[serde(default = "default_account")]
    pub account: String,

    /// API server port for health, metrics and reports
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Inventory snapshot the scanner reads resources from
    #[serde(default = "default_inventory_path")]
    pub inventory_path: PathBuf,

    /// JSON file holding one summary per scan date
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,

    /// Seconds between scheduled scans
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    #[serde(default)]
    pub policy: ScanPolicy,

    #[serde(default)]
    pub pricing: PricingConfig,
}

fn default_account() -> String {
    "default".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from("inventory.json")
}

fn default_history_path() -> PathBuf {
    PathBuf::from("scan-history.json")
}

fn default_scan_interval() -> u64 {
    86_400
}

impl ScannerConfig {
    /// Load configuration from an optional file and `SCANNER_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g.
    /// `SCANNER_POLICY__IDLE_THRESHOLD_PERCENT=10`.
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("SCANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config = builder.build().context("Failed to read scanner configuration")?;
        config
            .try_deserialize()
            .context("Invalid scanner configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use rust_decimal_macros::dec;

    fn from_json(json: &str) -> Result<ScannerConfig> {
        ScannerConfig::from_builder(
            config::Config::builder().add_source(File::from_str(json, FileFormat::Json)),
        )
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = from_json("{}").unwrap();

        assert_eq!(config.account, "default");
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.scan_interval_secs, 86_400);
        assert_eq!(config.inventory_path, PathBuf::from("inventory.json"));
        assert_eq!(config.policy, ScanPolicy::default());
        assert!(config.pricing.hourly.is_empty());
    }

    #[test]
    fn test_nested_policy_and_pricing_overrides() {
        let config = from_json(
            r#"{
                "account": "prod",
                "policy": { "idle_threshold_percent": 10.0, "sample_concurrency": 2 },
                "pricing": { "storage_gb_month": "0.08", "hourly": { "m5.large": "0.096" } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.account, "prod");
        assert_eq!(config.policy.idle_threshold_percent, 10.0);
        assert_eq!(config.policy.sample_concurrency, 2);
        assert_eq!(config.policy.utilization_window_days, 7);
        assert_eq!(config.pricing.storage_gb_month, Some(dec!(0.08)));
        assert_eq!(config.pricing.hourly["m5.large"], dec!(0.096));
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        assert!(from_json(r#"{ "api_port": "not-a-port" }"#).is_err());
    }
}
