//! API client for communicating with the cost-scanner daemon

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use scanner_lib::{ScanReport, ScanSummary};
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

/// API client for the scanner daemon
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Error body returned by the daemon
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Latest report, or `None` when the daemon has not completed a scan yet
    pub async fn latest_report(&self) -> Result<Option<ScanReport>> {
        let url = self.url("api/v1/report")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::parse(response).await.map(Some)
    }

    pub async fn history(&self, limit: usize) -> Result<Vec<ScanSummary>> {
        self.get(&format!("api/v1/history?limit={}", limit)).await
    }

    pub async fn trigger_scan(&self) -> Result<ScanReport> {
        let url = self.url("api/v1/scans")?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const REPORT: &str = r#"{
        "summary": {
            "scan_date": "2026-10-19",
            "scan_timestamp": "2026-10-19T06:00:00Z",
            "findings": [
                {
                    "resource_id": "vol-0f5f53ca9617302f8",
                    "monthly_cost": "0.80",
                    "resource_type": "volume",
                    "size_gb": 8,
                    "volume_type": "gp3",
                    "created_at": "2026-07-01T00:00:00Z"
                },
                {
                    "resource_id": "i-0f24cb36b4bd18a3b",
                    "monthly_cost": "8.35",
                    "resource_type": "instance",
                    "name": "test-instance",
                    "instance_type": "t2.micro",
                    "avg_utilization_percent": 0.4
                }
            ],
            "total_monthly_savings": "9.15"
        },
        "trend": {
            "previous_total": "10.00",
            "current_total": "9.15",
            "delta": "-0.85",
            "delta_percent": "-8.50"
        },
        "warnings": []
    }"#;

    #[tokio::test]
    async fn test_latest_report() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/report")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(REPORT)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let report = client.latest_report().await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(report.summary.findings.len(), 2);
        assert_eq!(report.summary.total_monthly_savings, dec!(9.15));
        assert_eq!(report.trend.previous_total, Some(dec!(10.00)));
    }

    #[tokio::test]
    async fn test_latest_report_before_first_scan() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/report")
            .with_status(404)
            .with_body(r#"{"error":"no scan has completed yet"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        assert!(client.latest_report().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_history_passes_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/history")
            .match_query(Matcher::UrlEncoded("limit".into(), "3".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"scan_date":"2026-10-19","scan_timestamp":"2026-10-19T06:00:00Z","findings":[],"total_monthly_savings":"0"}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let history = client.history(3).await.unwrap();

        mock.assert_async().await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_scan_surfaces_daemon_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/scans")
            .with_status(503)
            .with_body(
                r#"{"error":"volume enumeration failed: access denied","kind":"provider_unavailable"}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.trigger_scan().await.unwrap_err().to_string();

        assert!(err.contains("503"));
        assert!(err.contains("volume enumeration failed: access denied"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}
