//! Error taxonomy for scan passes
//!
//! Only enumeration failures abort a scan. Sampling and persistence faults
//! are recovered locally and surface as [`crate::models::ScanWarning`]s.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which resource listing failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationStep {
    Volumes,
    Instances,
}

impl std::fmt::Display for EnumerationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumerationStep::Volumes => write!(f, "volume"),
            EnumerationStep::Instances => write!(f, "instance"),
        }
    }
}

/// Fatal scan error
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{step} enumeration failed: {source}")]
    ProviderUnavailable {
        step: EnumerationStep,
        #[source]
        source: BoxError,
    },
}

impl ScanError {
    pub fn provider_unavailable(step: EnumerationStep, source: anyhow::Error) -> Self {
        ScanError::ProviderUnavailable {
            step,
            source: source.into(),
        }
    }

    /// Metric/log label for the error
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::ProviderUnavailable { .. } => "provider_unavailable",
        }
    }
}
