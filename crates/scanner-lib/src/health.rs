//! Health check infrastructure for the cost scanner
//!
//! Tracks the health of each boundary the scanner depends on and reports
//! liveness and readiness checks. Component status is derived from scan
//! outcomes: recoverable faults degrade a component, a fatal enumeration
//! failure marks the provider unhealthy.

use crate::error::ScanError;
use crate::models::{ScanReport, ScanWarning};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Faults were recovered from, results are still produced
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        matches!(self, ComponentStatus::Healthy | ComponentStatus::Degraded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            checked_at: Utc::now(),
        }
    }

    pub fn healthy() -> Self {
        Self::with_status(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_status(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status across components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .max_by_key(|s| match s {
                ComponentStatus::Healthy => 0,
                ComponentStatus::Degraded => 1,
                ComponentStatus::Unhealthy => 2,
            })
            .unwrap_or(ComponentStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_scan_at: Option<DateTime<Utc>>,
}

/// Component names for health tracking
pub mod components {
    /// Resource enumeration
    pub const PROVIDER: &str = "provider";
    /// Utilization lookups
    pub const SAMPLER: &str = "sampler";
    /// Scan history reads and writes
    pub const HISTORY: &str = "history";

    pub const ALL: [&str; 3] = [PROVIDER, SAMPLER, HISTORY];
}

/// Shared registry of component health
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    last_scan_at: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every scanner component as healthy
    pub async fn register_all(&self) {
        let mut map = self.components.write().await;
        for name in components::ALL {
            map.insert(name.to_string(), ComponentHealth::healthy());
        }
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.components
            .write()
            .await
            .insert(name.to_string(), health);
    }

    /// Fold the warnings of a completed scan into component status
    pub async fn record_report(&self, report: &ScanReport) {
        let sample_failures = report
            .warnings
            .iter()
            .filter(|w| matches!(w, ScanWarning::SampleUnavailable { .. }))
            .count();
        let persistence_failure = report
            .warnings
            .iter()
            .find(|w| matches!(w, ScanWarning::PersistenceFailure { .. }));

        self.update(components::PROVIDER, ComponentHealth::healthy())
            .await;
        self.update(
            components::SAMPLER,
            match sample_failures {
                0 => ComponentHealth::healthy(),
                n => ComponentHealth::degraded(format!("{} utilization lookups failed", n)),
            },
        )
        .await;
        self.update(
            components::HISTORY,
            match persistence_failure {
                None => ComponentHealth::healthy(),
                Some(w) => ComponentHealth::degraded(w.to_string()),
            },
        )
        .await;

        *self.last_scan_at.write().await = Some(report.summary.scan_timestamp);
    }

    /// Mark the provider unhealthy after a fatal scan error
    pub async fn record_failure(&self, error: &ScanError) {
        match error {
            ScanError::ProviderUnavailable { .. } => {
                self.update(
                    components::PROVIDER,
                    ComponentHealth::unhealthy(error.to_string()),
                )
                .await
            }
        }
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once a scan has completed and no component is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let last_scan_at = *self.last_scan_at.read().await;
        let health = self.health().await;

        let reason = if last_scan_at.is_none() {
            Some("No scan has completed yet".to_string())
        } else if health.status == ComponentStatus::Unhealthy {
            Some("Critical component unhealthy".to_string())
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason,
            last_scan_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnumerationStep;
    use crate::models::{HistoryOperation, ScanSummary, TrendResult};
    use rust_decimal::Decimal;

    fn report(warnings: Vec<ScanWarning>) -> ScanReport {
        ScanReport {
            summary: ScanSummary::new(Utc::now(), Vec::new()),
            trend: TrendResult::no_history(Decimal::ZERO),
            warnings,
        }
    }

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_register_all_components() {
        let registry = HealthRegistry::new();
        registry.register_all().await;

        let health = registry.health().await;
        for name in components::ALL {
            assert_eq!(health.components[name].status, ComponentStatus::Healthy);
        }
    }

    #[tokio::test]
    async fn test_readiness_requires_completed_scan() {
        let registry = HealthRegistry::new();
        registry.register_all().await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());

        registry.record_report(&report(Vec::new())).await;
        let readiness = registry.readiness().await;
        assert!(readiness.ready);
        assert!(readiness.last_scan_at.is_some());
    }

    #[tokio::test]
    async fn test_warnings_degrade_components() {
        let registry = HealthRegistry::new();
        registry.register_all().await;

        registry
            .record_report(&report(vec![
                ScanWarning::SampleUnavailable {
                    instance_id: "i-1".to_string(),
                    reason: "timeout".to_string(),
                },
                ScanWarning::PersistenceFailure {
                    operation: HistoryOperation::Write,
                    reason: "disk full".to_string(),
                },
            ]))
            .await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.status.is_operational());
        assert_eq!(
            health.components[components::SAMPLER].status,
            ComponentStatus::Degraded
        );
        assert_eq!(
            health.components[components::HISTORY].message.as_deref(),
            Some("history write failed: disk full")
        );
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_provider_failure_is_unhealthy_until_next_scan() {
        let registry = HealthRegistry::new();
        registry.register_all().await;
        registry.record_report(&report(Vec::new())).await;

        let error = ScanError::provider_unavailable(
            EnumerationStep::Volumes,
            anyhow::anyhow!("access denied"),
        );
        registry.record_failure(&error).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
        assert!(!registry.readiness().await.ready);

        registry.record_report(&report(Vec::new())).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }
}
