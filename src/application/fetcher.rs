use crate::domain::clock::Moment;
use crate::domain::errors::Result;
use crate::domain::instrument::Instrument;
use crate::domain::ports::{PriceSource, SampleCache};
use crate::domain::price::PriceSample;
use crate::interfaces::status_bar::CacheMeta;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a fetch, with cache metadata when caching is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub sample: PriceSample,
    pub cache_meta: Option<CacheMeta>,
}

/// Price source fronted by an optional freshness cache.
///
/// A stale or missing entry always triggers a network call, and a failed
/// call propagates its error; the stale entry is never served as a fallback.
pub struct CachedFetcher {
    source: Arc<dyn PriceSource>,
    cache: Option<Arc<dyn SampleCache>>,
}

impl CachedFetcher {
    pub fn new(source: Arc<dyn PriceSource>, cache: Option<Arc<dyn SampleCache>>) -> Self {
        Self { source, cache }
    }

    pub async fn fetch(&self, instrument: &Instrument, now: Moment) -> Result<Fetched> {
        let Some(cache) = &self.cache else {
            let sample = self.source.fetch(instrument, now).await?;
            return Ok(Fetched {
                sample,
                cache_meta: None,
            });
        };

        let max_age_seconds = cache.effective_max_age(now);

        if let Some((sample, age_seconds)) = cache.lookup(self.source.name(), instrument, now) {
            debug!("Serving {} from cache", instrument.symbol);
            return Ok(Fetched {
                sample,
                cache_meta: Some(CacheMeta {
                    age_seconds,
                    max_age_seconds,
                }),
            });
        }

        let sample = self.source.fetch(instrument, now).await?;
        cache.store(self.source.name(), instrument, &sample, now);
        info!(
            "Fetched fresh {} sample for {}",
            self.source.name(),
            instrument.symbol
        );

        Ok(Fetched {
            sample,
            cache_meta: Some(CacheMeta {
                age_seconds: 0,
                max_age_seconds,
            }),
        })
    }
}
