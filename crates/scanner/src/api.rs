//! HTTP API for health checks, Prometheus metrics and scan reports

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use scanner_lib::{
    health::{ComponentStatus, HealthRegistry},
    history, ScanError, ScanReport, ScanService,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub health_registry: HealthRegistry,
    service: Arc<ScanService>,
    latest: RwLock<Option<ScanReport>>,
    /// Held for the duration of a scan so manual and scheduled runs never overlap
    scan_lock: Mutex<()>,
}

impl AppState {
    pub fn new(service: Arc<ScanService>) -> Self {
        Self {
            health_registry: service.health().clone(),
            service,
            latest: RwLock::new(None),
            scan_lock: Mutex::new(()),
        }
    }

    /// Run one scan and remember its report
    pub async fn run_scan(&self) -> Result<ScanReport, ScanError> {
        let _guard = self.scan_lock.lock().await;
        let report = self.service.run_scan().await?;
        *self.latest.write().await = Some(report.clone());
        Ok(report)
    }

    pub async fn latest_report(&self) -> Option<ScanReport> {
        self.latest.read().await.clone()
    }
}

/// Error body returned by the report endpoints
pub enum ApiError {
    NoReport,
    Scan(ScanError),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NoReport => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "no scan has completed yet" }),
            ),
            ApiError::Scan(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({ "error": e.to_string(), "kind": e.kind() }),
            ),
            ApiError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": e.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Health check response - returns 200 if operational, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    ))
}

async fn latest_report(State(state): State<Arc<AppState>>) -> Result<Json<ScanReport>, ApiError> {
    state
        .latest_report()
        .await
        .map(Json)
        .ok_or(ApiError::NoReport)
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

async fn scan_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.service.history();
    let summaries = history::recent(store.as_ref(), params.limit)
        .await
        .map_err(ApiError::Internal)?;

    Ok(Json(summaries))
}

async fn trigger_scan(State(state): State<Arc<AppState>>) -> Result<Json<ScanReport>, ApiError> {
    info!("Scan requested over HTTP");
    state.run_scan().await.map(Json).map_err(ApiError::Scan)
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/report", get(latest_report))
        .route("/api/v1/history", get(scan_history))
        .route("/api/v1/scans", post(trigger_scan))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
