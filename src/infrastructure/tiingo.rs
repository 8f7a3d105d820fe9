//! Tiingo IEX snapshot source
//!
//! `GET {base}/iex/{ticker}` returns last trade and previous close in one
//! object, so a single request yields a complete sample.

use crate::domain::clock::Moment;
use crate::domain::errors::{Result, TickerError};
use crate::domain::instrument::Instrument;
use crate::domain::ports::PriceSource;
use crate::domain::price::PriceSample;
use crate::infrastructure::extractor::{RawResponse, extract};
use crate::infrastructure::http_client_factory::fetch_json;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::info;
use url::Url;

pub const TIINGO_BASE_URL: &str = "https://api.tiingo.com";

pub struct TiingoPriceSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TiingoPriceSource {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// `{base}/iex/{symbol}`, with the symbol percent-encoded as one path segment.
    fn snapshot_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            TickerError::config(format!("invalid base_url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| TickerError::config(format!("base_url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("iex")
            .push(symbol);
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for TiingoPriceSource {
    fn name(&self) -> &'static str {
        "tiingo"
    }

    async fn fetch(&self, instrument: &Instrument, now: Moment) -> Result<PriceSample> {
        let symbol = instrument.symbol.as_str();
        info!("Fetching Tiingo snapshot for {}", symbol);

        let request = self
            .client
            .get(self.snapshot_url(symbol)?)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Token {}", self.api_key));

        let body = fetch_json(request, symbol).await?;
        let extracted = extract(symbol, &RawResponse::Snapshot(body))?;

        Ok(PriceSample::new(
            symbol,
            extracted.current,
            extracted.reference,
            now.utc,
        ))
    }
}
