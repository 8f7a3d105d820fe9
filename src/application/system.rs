use crate::application::fetcher::CachedFetcher;
use crate::config::{Config, Source};
use crate::domain::classifier::classify_reference;
use crate::domain::clock::Moment;
use crate::domain::errors::{Result, TickerError};
use crate::domain::instrument::Instrument;
use crate::domain::ports::{PriceSource, SampleCache};
use crate::domain::rotation;
use crate::infrastructure::binance::BinancePriceSource;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use crate::infrastructure::sample_cache::FileSampleCache;
use crate::infrastructure::tiingo::TiingoPriceSource;
use crate::interfaces::status_bar::OutputRecord;
use std::sync::Arc;
use tracing::info;

/// One configured tickerbar: rotation, fetch, classify, render.
pub struct Application {
    pub config: Config,
    fetcher: CachedFetcher,
}

impl Application {
    pub fn build(config: Config) -> Result<Self> {
        info!(
            "Building tickerbar (source: {}, {} instruments)",
            config.source,
            config.instruments.len()
        );

        let client = HttpClientFactory::create_client(config.timeout)?;

        let source: Arc<dyn PriceSource> = match config.source {
            Source::Tiingo => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    TickerError::credential("Tiingo requires an API key")
                })?;
                Arc::new(TiingoPriceSource::new(client, &config.base_url, api_key))
            }
            Source::Binance => Arc::new(BinancePriceSource::new(
                client,
                &config.base_url,
                config.lookback,
            )),
        };

        let cache = config.cache.as_ref().map(|cache| {
            Arc::new(FileSampleCache::new(&cache.dir, cache.policy)) as Arc<dyn SampleCache>
        });

        Ok(Self::with_parts(config, source, cache))
    }

    /// Assembles an application from explicit collaborators.
    pub fn with_parts(
        config: Config,
        source: Arc<dyn PriceSource>,
        cache: Option<Arc<dyn SampleCache>>,
    ) -> Self {
        Self {
            config,
            fetcher: CachedFetcher::new(source, cache),
        }
    }

    /// Instrument active at `now`.
    pub fn select_instrument(&self, now: Moment) -> Result<&Instrument> {
        let now_seconds = u64::try_from(now.unix_seconds())
            .map_err(|_| TickerError::config("system clock is before the Unix epoch"))?;
        let index = rotation::select(
            now_seconds,
            self.config.rotation_seconds,
            self.config.instruments.len(),
        )?;
        Ok(&self.config.instruments[index])
    }

    pub async fn run(&self, now: Moment) -> Result<OutputRecord> {
        let instrument = self.select_instrument(now)?;
        info!("Selected {}", instrument.symbol);

        let fetched = self.fetcher.fetch(instrument, now).await?;
        let sample = &fetched.sample;

        let (change, class) = classify_reference(
            &sample.symbol,
            sample.current_value,
            sample.reference_value,
            &self.config.thresholds,
        )?;

        Ok(OutputRecord::new(
            instrument,
            &self.config.currency_prefix,
            sample.current_value,
            change,
            class,
            fetched.cache_meta,
        ))
    }
}
