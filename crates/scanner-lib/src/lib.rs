//! Cost scanner library
//!
//! This crate provides the core functionality for:
//! - Classifying unattached volumes and idle instances as waste
//! - Estimating their monthly cost from a price table
//! - Persisting scan summaries and computing day-over-day trends
//! - Health checks and observability

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod policy;
pub mod pricing;
pub mod provider;
pub mod service;
pub mod trend;

pub use aggregator::{AggregateOutcome, ScanAggregator};
pub use error::{EnumerationStep, ScanError};
pub use health::{ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse};
pub use models::*;
pub use observability::{ScannerMetrics, StructuredLogger};
pub use policy::{PricingConfig, ScanPolicy};
pub use pricing::PricingTable;
pub use service::{ScanService, ScanServiceBuilder};
pub use trend::TrendAnalyzer;
