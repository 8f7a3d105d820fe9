use crate::domain::errors::{Result, TickerError};
use crate::domain::price::{PriceChange, Reference};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal bucket describing direction and magnitude of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    CritDown,
    Down,
    Up,
    WayUp,
}

impl Class {
    pub fn as_str(&self) -> &'static str {
        match self {
            Class::CritDown => "critdown",
            Class::Down => "down",
            Class::Up => "up",
            Class::WayUp => "wayup",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold group as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub critdown: f64,
    pub down: f64,
    pub wayup: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            critdown: -5.0,
            down: 0.0,
            wayup: 5.0,
        }
    }
}

impl ClassificationThresholds {
    /// Converts to decimal boundaries, enforcing `critdown < down < wayup`.
    pub fn validate(&self) -> Result<Thresholds> {
        let to_decimal = |name: &str, value: f64| {
            Decimal::from_f64(value).ok_or_else(|| {
                TickerError::config(format!("threshold {} must be a finite number, got {}", name, value))
            })
        };

        let critical_down = to_decimal("critdown", self.critdown)?;
        let down = to_decimal("down", self.down)?;
        let way_up = to_decimal("wayup", self.wayup)?;

        if !(critical_down < down && down < way_up) {
            return Err(TickerError::config(format!(
                "thresholds must satisfy critdown < down < wayup, got critdown={} down={} wayup={}",
                self.critdown, self.down, self.wayup
            )));
        }

        Ok(Thresholds {
            critical_down,
            down,
            way_up,
        })
    }
}

/// Validated classification boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    critical_down: Decimal,
    down: Decimal,
    way_up: Decimal,
}

impl Thresholds {
    /// First match wins; all comparisons are strict.
    pub fn bucket(&self, percent_change: Decimal) -> Class {
        if percent_change < self.critical_down {
            Class::CritDown
        } else if percent_change < self.down {
            Class::Down
        } else if percent_change > self.way_up {
            Class::WayUp
        } else {
            Class::Up
        }
    }
}

/// Percent change rounded to two places, midpoint away from zero.
pub fn percent_change(symbol: &str, current: Decimal, reference: Decimal) -> Result<Decimal> {
    if reference.is_zero() {
        return Err(TickerError::DivisionGuard {
            symbol: symbol.to_string(),
        });
    }

    let raw = current
        .checked_sub(reference)
        .and_then(|delta| delta.checked_div(reference))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| TickerError::data_shape(symbol, "percent change out of range"))?;
    let rounded = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    // Avoid rendering "-0.00"
    if rounded.is_zero() {
        Ok(Decimal::ZERO)
    } else {
        Ok(rounded)
    }
}

pub fn classify(
    symbol: &str,
    current: Decimal,
    reference: Decimal,
    thresholds: &Thresholds,
) -> Result<(Decimal, Class)> {
    let pct = percent_change(symbol, current, reference)?;
    Ok((pct, thresholds.bucket(pct)))
}

/// Like [`classify`], but an unavailable baseline yields a non-numeric change
/// classified as `up`.
pub fn classify_reference(
    symbol: &str,
    current: Decimal,
    reference: Reference,
    thresholds: &Thresholds,
) -> Result<(PriceChange, Class)> {
    match reference {
        Reference::Value(reference) => {
            let (pct, class) = classify(symbol, current, reference, thresholds)?;
            Ok((PriceChange::Percent(pct), class))
        }
        Reference::NotAvailable => Ok((PriceChange::Unavailable, Class::Up)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn thresholds() -> Thresholds {
        ClassificationThresholds {
            critdown: -10.0,
            down: 0.0,
            wayup: 5.0,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_bucket_boundaries() {
        let t = thresholds();

        // critdown comparison is strict: exactly -10.00 stays "down"
        assert_eq!(t.bucket(dec!(-10.00)), Class::Down);
        assert_eq!(t.bucket(dec!(-10.01)), Class::CritDown);
        assert_eq!(t.bucket(dec!(-5)), Class::Down);
        assert_eq!(t.bucket(dec!(-0.01)), Class::Down);
        assert_eq!(t.bucket(dec!(0)), Class::Up);
        assert_eq!(t.bucket(dec!(5.00)), Class::Up);
        assert_eq!(t.bucket(dec!(5.01)), Class::WayUp);
    }

    #[test]
    fn test_percent_change_rounding() {
        assert_eq!(
            percent_change("SYM", dec!(123.45), dec!(120.00)).unwrap(),
            dec!(2.88)
        );
        // 2.875 midpoint rounds away from zero in both directions
        assert_eq!(
            percent_change("SYM", dec!(102.875), dec!(100)).unwrap(),
            dec!(2.88)
        );
        assert_eq!(
            percent_change("SYM", dec!(97.125), dec!(100)).unwrap(),
            dec!(-2.88)
        );
    }

    #[test]
    fn test_tiny_negative_change_is_plain_zero() {
        let pct = percent_change("SYM", dec!(99.999), dec!(100)).unwrap();
        assert_eq!(pct, Decimal::ZERO);
        assert!(!pct.is_sign_negative());
        assert_eq!(PriceChange::Percent(pct).to_string(), "0.00");
    }

    #[test]
    fn test_classify_round_trip_fixture() {
        let (pct, class) = classify("SYM", dec!(123.45), dec!(120.00), &thresholds()).unwrap();
        assert_eq!(pct, dec!(2.88));
        assert_eq!(class, Class::Up);
    }

    #[test]
    fn test_zero_reference_is_guarded() {
        let err = classify("SYM", dec!(1), Decimal::ZERO, &thresholds()).unwrap_err();
        assert!(matches!(err, TickerError::DivisionGuard { .. }));
    }

    #[test]
    fn test_overflowing_ratio_is_data_shape_error() {
        let err = classify(
            "SYM",
            dec!(100000000000000000000),
            dec!(0.00000001),
            &thresholds(),
        )
        .unwrap_err();
        assert!(matches!(err, TickerError::DataShape { .. }));
        assert_eq!(err.exit_code(), 5);

        let err = percent_change("SYM", Decimal::MIN, Decimal::MAX).unwrap_err();
        assert!(matches!(err, TickerError::DataShape { .. }));
    }

    #[test]
    fn test_unavailable_reference_defaults_to_up() {
        let (change, class) =
            classify_reference("SYM", dec!(10), Reference::NotAvailable, &thresholds()).unwrap();
        assert_eq!(change, PriceChange::Unavailable);
        assert_eq!(class, Class::Up);
    }

    #[test]
    fn test_misordered_thresholds_rejected() {
        let cases = [
            (0.0, 0.0, 5.0),
            (-5.0, 6.0, 5.0),
            (1.0, 0.0, 5.0),
            (-5.0, 0.0, 0.0),
        ];
        for (critdown, down, wayup) in cases {
            let result = ClassificationThresholds {
                critdown,
                down,
                wayup,
            }
            .validate();
            assert!(
                matches!(result, Err(TickerError::Configuration { .. })),
                "expected rejection for {critdown}/{down}/{wayup}"
            );
        }
    }

    #[test]
    fn test_non_finite_thresholds_rejected() {
        let result = ClassificationThresholds {
            critdown: f64::NAN,
            down: 0.0,
            wayup: 5.0,
        }
        .validate();
        assert!(matches!(result, Err(TickerError::Configuration { .. })));
    }

    #[test]
    fn test_class_labels() {
        assert_eq!(Class::CritDown.as_str(), "critdown");
        assert_eq!(Class::WayUp.to_string(), "wayup");
        assert_eq!(serde_json::to_string(&Class::Down).unwrap(), "\"down\"");
    }
}
