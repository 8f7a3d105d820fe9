//! Binance Market Data Source
//!
//! Series-shaped source built from two public endpoints:
//! - `/api/v3/ticker/price` for the current price
//! - `/api/v3/klines` for the hourly candle at the look-back cutoff

use crate::domain::clock::Moment;
use crate::domain::errors::Result;
use crate::domain::instrument::Instrument;
use crate::domain::ports::PriceSource;
use crate::domain::price::PriceSample;
use crate::infrastructure::extractor::{RawResponse, extract};
use crate::infrastructure::http_client_factory::fetch_json;
use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use tracing::{debug, info};

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";

/// Candles returned around the cutoff; only the latest at or before it is used.
const KLINE_LIMIT: &str = "3";

pub struct BinancePriceSource {
    client: Client,
    base_url: String,
    lookback: Duration,
}

impl BinancePriceSource {
    pub fn new(client: Client, base_url: impl Into<String>, lookback: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lookback,
        }
    }
}

/// `BTC/USDT` and `btc-usdt` both become `BTCUSDT`.
pub fn denormalize_crypto_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != '/' && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

#[async_trait]
impl PriceSource for BinancePriceSource {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch(&self, instrument: &Instrument, now: Moment) -> Result<PriceSample> {
        let symbol = instrument.symbol.as_str();
        let api_symbol = denormalize_crypto_symbol(symbol);
        let cutoff_ms = (now.utc - self.lookback).timestamp_millis();
        let cutoff_ms_str = cutoff_ms.to_string();

        info!("Fetching Binance price for {} ({})", symbol, api_symbol);

        let ticker_request = self
            .client
            .get(format!("{}/api/v3/ticker/price", self.base_url))
            .query(&[("symbol", api_symbol.as_str())]);
        let ticker = fetch_json(ticker_request, symbol).await?;

        let klines_request = self
            .client
            .get(format!("{}/api/v3/klines", self.base_url))
            .query(&[
                ("symbol", api_symbol.as_str()),
                ("interval", "1h"),
                ("endTime", cutoff_ms_str.as_str()),
                ("limit", KLINE_LIMIT),
            ]);
        let candles = fetch_json(klines_request, symbol).await?;

        debug!(
            "Binance klines for {}: {} rows up to {}",
            api_symbol,
            candles.as_array().map_or(0, |rows| rows.len()),
            cutoff_ms
        );

        let extracted = extract(
            symbol,
            &RawResponse::Series {
                ticker,
                candles,
                cutoff_ms,
            },
        )?;

        Ok(PriceSample::new(
            symbol,
            extracted.current,
            extracted.reference,
            now.utc,
        ))
    }
}
