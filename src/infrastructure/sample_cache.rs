use crate::domain::clock::Moment;
use crate::domain::instrument::Instrument;
use crate::domain::ports::SampleCache;
use crate::domain::price::PriceSample;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Max-age selection; markets are closed on weekends so entries may live longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub weekday_max_age: u64,
    pub weekend_max_age: u64,
}

impl CachePolicy {
    pub fn effective_max_age(&self, now: Moment) -> u64 {
        if now.is_weekend() {
            self.weekend_max_age
        } else {
            self.weekday_max_age
        }
    }
}

/// On-disk record, one file per (source, instrument).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub symbol: String,
    pub source: String,
    pub sample: PriceSample,
    /// Unix seconds of the successful fetch.
    pub fetched_at: i64,
    /// Max-age in effect when written. Freshness is judged against the
    /// max-age in effect at lookup time.
    pub max_age_seconds: u64,
}

impl CacheEntry {
    /// Age in seconds when `now` falls in `[fetched_at, fetched_at + max_age)`.
    pub fn fresh_age(&self, now_unix: i64, max_age: u64) -> Option<u64> {
        let age = now_unix.checked_sub(self.fetched_at)?;
        let age = u64::try_from(age).ok()?;
        (age < max_age).then_some(age)
    }
}

pub struct FileSampleCache {
    dir: PathBuf,
    policy: CachePolicy,
}

impl FileSampleCache {
    pub fn new(dir: impl Into<PathBuf>, policy: CachePolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    /// `<user cache dir>/tickerbar`, falling back to the system temp dir.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(env!("CARGO_PKG_NAME"))
    }

    pub fn entry_path(&self, source: &str, instrument: &Instrument) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", source, instrument.cache_key()))
    }

    fn read_entry(path: &Path) -> Option<CacheEntry> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache entry at {:?}", path);
                return None;
            }
            Err(e) => {
                warn!("Failed to read cache entry {:?}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {:?}: {}", path, e);
                None
            }
        }
    }

    fn write_entry(&self, path: &Path, entry: &CacheEntry) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string(entry)?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&temp_path, content)?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl SampleCache for FileSampleCache {
    fn lookup(
        &self,
        source: &str,
        instrument: &Instrument,
        now: Moment,
    ) -> Option<(PriceSample, u64)> {
        let path = self.entry_path(source, instrument);
        let entry = Self::read_entry(&path)?;

        if entry.symbol != instrument.symbol || entry.source != source {
            warn!(
                "Cache entry {:?} belongs to {}/{}, ignoring",
                path, entry.source, entry.symbol
            );
            return None;
        }

        let max_age = self.effective_max_age(now);
        match entry.fresh_age(now.unix_seconds(), max_age) {
            Some(age) => {
                info!(
                    "Cache hit for {} (age {}s < {}s)",
                    instrument.symbol, age, max_age
                );
                Some((entry.sample, age))
            }
            None => {
                debug!(
                    "Cache entry for {} expired (fetched_at={}, max_age={}s)",
                    instrument.symbol, entry.fetched_at, max_age
                );
                None
            }
        }
    }

    fn store(&self, source: &str, instrument: &Instrument, sample: &PriceSample, now: Moment) {
        let path = self.entry_path(source, instrument);
        let entry = CacheEntry {
            symbol: instrument.symbol.clone(),
            source: source.to_string(),
            sample: sample.clone(),
            fetched_at: now.unix_seconds(),
            max_age_seconds: self.effective_max_age(now),
        };

        match self.write_entry(&path, &entry) {
            Ok(()) => debug!("Saved cache entry to {:?}", path),
            Err(e) => warn!("Failed to write cache entry {:?}: {}", path, e),
        }
    }

    fn effective_max_age(&self, now: Moment) -> u64 {
        self.policy.effective_max_age(now)
    }
}
