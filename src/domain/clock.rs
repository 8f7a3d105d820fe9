use chrono::{DateTime, Datelike, Local, Utc, Weekday};

/// The instant an invocation evaluates against.
///
/// Captured once at startup so rotation, cache freshness and the series
/// look-back all agree on the same "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    pub utc: DateTime<Utc>,
    /// Day of week in the local timezone, where market closures are observed.
    pub weekday: Weekday,
}

impl Moment {
    pub fn now() -> Self {
        let local = Local::now();
        Self {
            utc: local.with_timezone(&Utc),
            weekday: local.weekday(),
        }
    }

    pub fn at(utc: DateTime<Utc>, weekday: Weekday) -> Self {
        Self { utc, weekday }
    }

    pub fn unix_seconds(&self) -> i64 {
        self.utc.timestamp()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday, Weekday::Sat | Weekday::Sun)
    }
}
