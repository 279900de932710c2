//! Waste classification
//!
//! This module provides classifiers for:
//! - Unattached storage volumes
//! - Idle running compute instances
//!
//! Each classifier rounds per-finding costs before returning, so the sum of
//! the returned findings is reproducible downstream.

mod instance;
mod volume;

pub use instance::{InstanceClassification, InstanceClassifier};
pub use volume::{VolumeClassification, VolumeClassifier};

/// Round a utilization percentage to two fractional digits
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
