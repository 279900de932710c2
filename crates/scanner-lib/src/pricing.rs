//! Unit prices for storage and compute classes

use crate::policy::PricingConfig;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Fractional digits kept on every monetary amount
pub const CURRENCY_SCALE: u32 = 2;

/// Round a monetary amount to cents, half-up (midpoint away from zero)
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Static price lookup.
///
/// Unrecognized compute classes are priced at the fallback rate, never
/// rejected.
#[derive(Debug, Clone)]
pub struct PricingTable {
    storage_gb_month: Decimal,
    hourly: HashMap<String, Decimal>,
    fallback_hourly: Decimal,
}

impl Default for PricingTable {
    fn default() -> Self {
        let hourly = [
            ("t2.micro", Decimal::new(116, 4)),
            ("t2.small", Decimal::new(23, 3)),
            ("t2.medium", Decimal::new(464, 4)),
            ("t3.micro", Decimal::new(104, 4)),
            ("t3.small", Decimal::new(208, 4)),
            ("t3.medium", Decimal::new(416, 4)),
        ]
        .into_iter()
        .map(|(class, rate)| (class.to_string(), rate))
        .collect();

        Self {
            storage_gb_month: Decimal::new(10, 2),
            hourly,
            fallback_hourly: Decimal::new(5, 2),
        }
    }
}

impl PricingTable {
    pub fn new(
        storage_gb_month: Decimal,
        hourly: HashMap<String, Decimal>,
        fallback_hourly: Decimal,
    ) -> Self {
        Self {
            storage_gb_month,
            hourly,
            fallback_hourly,
        }
    }

    /// Default table with configured overrides applied on top
    pub fn from_config(config: &PricingConfig) -> Self {
        let mut table = Self::default();
        if let Some(rate) = config.storage_gb_month {
            table.storage_gb_month = rate;
        }
        if let Some(rate) = config.fallback_hourly {
            table.fallback_hourly = rate;
        }
        table
            .hourly
            .extend(config.hourly.iter().map(|(k, v)| (k.clone(), *v)));
        table
    }

    /// Storage price per GB-month
    pub fn cost_per_gb_month(&self) -> Decimal {
        self.storage_gb_month
    }

    /// Hourly price of a compute class, or the fallback rate when unknown
    pub fn hourly_rate(&self, class_tag: &str) -> Decimal {
        self.hourly
            .get(class_tag)
            .copied()
            .unwrap_or(self.fallback_hourly)
    }

    pub fn fallback_hourly_rate(&self) -> Decimal {
        self.fallback_hourly
    }

    pub fn is_known_class(&self, class_tag: &str) -> bool {
        self.hourly.contains_key(class_tag)
    }
}
