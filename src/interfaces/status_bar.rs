//! Status-bar output
//!
//! Renders the waybar-style `{"text", "tooltip", "class"}` record. Keys are
//! always present and always strings; escaping is left to `serde_json`.

use crate::domain::classifier::Class;
use crate::domain::errors::{Result, TickerError};
use crate::domain::instrument::Instrument;
use crate::domain::price::PriceChange;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Cache age reported in the tooltip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMeta {
    pub age_seconds: u64,
    pub max_age_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    pub text: String,
    pub tooltip: String,
    pub class: Class,
}

impl OutputRecord {
    pub fn new(
        instrument: &Instrument,
        currency_prefix: &str,
        current: Decimal,
        change: PriceChange,
        class: Class,
        cache_meta: Option<CacheMeta>,
    ) -> Self {
        let price = current.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{} {}{:.2} ({}%)", instrument, currency_prefix, price, change);

        let tooltip = cache_meta
            .map(|meta| {
                format!(
                    "Cache Age: {} seconds (Max allowed: {} seconds)",
                    meta.age_seconds, meta.max_age_seconds
                )
            })
            .unwrap_or_default();

        Self {
            text,
            tooltip,
            class,
        }
    }

    /// Single-line JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TickerError::config(format!("failed to serialize output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    #[test]
    fn test_render_fixture_text() {
        let json = OutputRecord::new(
            &Instrument::new("SYM"),
            "$",
            dec!(123.45),
            PriceChange::Percent(dec!(2.88)),
            Class::Up,
            None,
        )
        .to_json()
        .unwrap();

        assert_eq!(
            json,
            r#"{"text":"SYM $123.45 (2.88%)","tooltip":"","class":"up"}"#
        );
    }

    #[test]
    fn test_render_negative_with_glyph_and_cache() {
        let record = OutputRecord::new(
            &Instrument::new("BTCUSDT").with_glyph("₿"),
            "$",
            dec!(64999.999),
            PriceChange::Percent(dec!(-12.5)),
            Class::CritDown,
            Some(CacheMeta {
                age_seconds: 42,
                max_age_seconds: 300,
            }),
        );

        assert_eq!(record.text, "₿ BTCUSDT $65000.00 (-12.50%)");
        assert_eq!(
            record.tooltip,
            "Cache Age: 42 seconds (Max allowed: 300 seconds)"
        );
        assert_eq!(record.class, Class::CritDown);
    }

    #[test]
    fn test_unavailable_change_is_valid_json() {
        let json = OutputRecord::new(
            &Instrument::new("ODD\"SYM"),
            "€",
            dec!(7),
            PriceChange::Unavailable,
            Class::Up,
            None,
        )
        .to_json()
        .unwrap();

        let parsed: Value = serde_json::from_str(&json).unwrap();
        let object = parsed.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(parsed["text"], "ODD\"SYM €7.00 (N/A%)");
        assert_eq!(parsed["class"], "up");
        assert!(object.values().all(Value::is_string));
        assert!(!json.contains('\n'));
    }
}
