//! Time-derived instrument rotation.
//!
//! The active instrument is a pure function of wall-clock time, so a restarted
//! process always lands on the same selection as the one it replaces.

use crate::domain::errors::{Result, TickerError};

/// `(now_seconds / period_seconds) % count`
pub fn select(now_seconds: u64, period_seconds: u64, count: usize) -> Result<usize> {
    if period_seconds == 0 {
        return Err(TickerError::config("rotation_seconds must be greater than 0"));
    }
    if count == 0 {
        return Err(TickerError::config("instrument list is empty"));
    }

    let bucket = now_seconds / period_seconds;
    Ok((bucket % count as u64) as usize)
}
