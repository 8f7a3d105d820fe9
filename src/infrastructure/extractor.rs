//! Response shape extraction
//!
//! Each upstream API is modelled as one variant of [`RawResponse`] with its own
//! extraction function. Anything that matches neither shape is a
//! `DataShape` error.

use crate::domain::errors::{Result, TickerError};
use crate::domain::price::{PriceChange, Reference};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Raw upstream payloads, before any field access.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// One object carrying both the current and the previous-close values.
    Snapshot(Value),
    /// A current price plus historical candles; the reference is the close of
    /// the latest candle opened at or before `cutoff_ms`.
    Series {
        ticker: Value,
        candles: Value,
        cutoff_ms: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted {
    pub current: Decimal,
    pub reference: Reference,
}

pub fn extract(symbol: &str, raw: &RawResponse) -> Result<Extracted> {
    match raw {
        RawResponse::Snapshot(body) => extract_snapshot(symbol, body),
        RawResponse::Series {
            ticker,
            candles,
            cutoff_ms,
        } => extract_series(symbol, ticker, candles, *cutoff_ms),
    }
}

/// Tiingo IEX: `[{"tngoLast": 123.45, "prevClose": 120.0, ...}]`
pub fn extract_snapshot(symbol: &str, body: &Value) -> Result<Extracted> {
    let entry = match body {
        Value::Array(items) => items.first().ok_or_else(|| {
            TickerError::data_shape(symbol, "response array is empty")
        })?,
        Value::Object(_) => body,
        _ => {
            return Err(TickerError::data_shape(
                symbol,
                "expected an object or an array of objects",
            ));
        }
    };

    let current_key = match entry.get("tngoLast") {
        Some(v) if !v.is_null() => "tngoLast",
        _ => "last",
    };
    let current = required_number(symbol, entry, current_key)?;
    let reference = guard_reference(symbol, numeric_field(symbol, entry, "prevClose")?)?;

    Ok(Extracted { current, reference })
}

/// Binance: ticker `{"symbol": "BTCUSDT", "price": "65000.10"}` plus klines
/// `[[open_time_ms, open, high, low, close, ...], ...]`.
pub fn extract_series(
    symbol: &str,
    ticker: &Value,
    candles: &Value,
    cutoff_ms: i64,
) -> Result<Extracted> {
    let current = required_number(symbol, ticker, "price")?;

    let rows = candles
        .as_array()
        .ok_or_else(|| TickerError::data_shape(symbol, "candles response is not an array"))?;

    let mut latest: Option<(i64, &Value)> = None;
    for row in rows {
        let open_time = candle_open_time(symbol, row)?;
        if open_time > cutoff_ms {
            continue;
        }
        if latest.is_none_or(|(t, _)| open_time > t) {
            latest = Some((open_time, row));
        }
    }

    let reference = match latest {
        Some((_, row)) => match row.get(4).and_then(parse_number) {
            Some(field @ NumericField::Number(_)) => guard_reference(symbol, field)?,
            _ => {
                return Err(TickerError::data_shape(
                    symbol,
                    format!("candle close is not numeric: {}", row),
                ));
            }
        },
        None => {
            warn!(
                "No candle at or before look-back cutoff for {}, using current price as reference",
                symbol
            );
            Reference::Value(current)
        }
    };

    Ok(Extracted { current, reference })
}

fn candle_open_time(symbol: &str, row: &Value) -> Result<i64> {
    let cells = row
        .as_array()
        .filter(|cells| cells.len() >= 5)
        .ok_or_else(|| TickerError::data_shape(symbol, format!("malformed candle: {}", row)))?;
    cells[0]
        .as_i64()
        .ok_or_else(|| TickerError::data_shape(symbol, "candle open time is not an integer"))
}

enum NumericField {
    Number(Decimal),
    NotAvailable,
}

fn numeric_field(symbol: &str, object: &Value, key: &str) -> Result<NumericField> {
    let value = object
        .get(key)
        .ok_or_else(|| TickerError::data_shape(symbol, format!("missing field '{}'", key)))?;
    if value.is_null() {
        return Err(TickerError::data_shape(symbol, format!("field '{}' is null", key)));
    }
    parse_number(value).ok_or_else(|| {
        TickerError::data_shape(symbol, format!("field '{}' is not numeric: {}", key, value))
    })
}

fn required_number(symbol: &str, object: &Value, key: &str) -> Result<Decimal> {
    match numeric_field(symbol, object, key)? {
        NumericField::Number(value) => Ok(value),
        NumericField::NotAvailable => Err(TickerError::data_shape(
            symbol,
            format!("field '{}' is marked not available", key),
        )),
    }
}

fn guard_reference(symbol: &str, field: NumericField) -> Result<Reference> {
    match field {
        NumericField::Number(value) if value.is_zero() => Err(TickerError::DivisionGuard {
            symbol: symbol.to_string(),
        }),
        NumericField::Number(value) => Ok(Reference::Value(value)),
        NumericField::NotAvailable => Ok(Reference::NotAvailable),
    }
}

/// JSON numbers and numeric strings both count; so does the explicit marker.
fn parse_number(value: &Value) -> Option<NumericField> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
                .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                .map(NumericField::Number)
        }
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case(PriceChange::UNAVAILABLE_MARKER) {
                Some(NumericField::NotAvailable)
            } else {
                Decimal::from_str(s).ok().map(NumericField::Number)
            }
        }
        _ => None,
    }
}
