use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Baseline used for the percent-change computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reference {
    Value(Decimal),
    /// Upstream explicitly reported the baseline as not available.
    NotAvailable,
}

/// One observation of an instrument: the current value and its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub symbol: String,
    pub current_value: Decimal,
    pub reference_value: Reference,
    pub observed_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(
        symbol: impl Into<String>,
        current_value: Decimal,
        reference_value: Reference,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            current_value,
            reference_value,
            observed_at,
        }
    }
}

/// Percent change as rendered to the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceChange {
    Percent(Decimal),
    Unavailable,
}

impl PriceChange {
    pub const UNAVAILABLE_MARKER: &'static str = "N/A";
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceChange::Percent(pct) => write!(f, "{:.2}", pct),
            PriceChange::Unavailable => f.write_str(Self::UNAVAILABLE_MARKER),
        }
    }
}
