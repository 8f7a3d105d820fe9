use crate::domain::clock::Moment;
use crate::domain::errors::Result;
use crate::domain::instrument::Instrument;
use crate::domain::price::PriceSample;
use async_trait::async_trait;

/// An upstream market-data API.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Stable identifier, part of the cache key.
    fn name(&self) -> &'static str;

    async fn fetch(&self, instrument: &Instrument, now: Moment) -> Result<PriceSample>;
}

/// Single-slot-per-instrument sample store.
pub trait SampleCache: Send + Sync {
    /// Returns the cached sample and its age in seconds when still fresh.
    fn lookup(&self, source: &str, instrument: &Instrument, now: Moment)
    -> Option<(PriceSample, u64)>;

    fn store(&self, source: &str, instrument: &Instrument, sample: &PriceSample, now: Moment);

    /// Max-age in effect at `now`.
    fn effective_max_age(&self, now: Moment) -> u64;
}
