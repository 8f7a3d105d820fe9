use crate::domain::errors::{Result, TickerError};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the single HTTP client used by an invocation.
    ///
    /// No retry middleware: a failed request fails the run, and the status bar
    /// re-invokes on its own schedule.
    pub fn create_client(timeout: Duration) -> Result<Client> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TickerError::config(format!("failed to build HTTP client: {}", e)))
    }
}

/// Sends `request` and parses the body as JSON.
///
/// Transport failures and non-2xx statuses are `Network` errors; a body that
/// is not JSON is a `DataShape` error.
pub async fn fetch_json(request: RequestBuilder, symbol: &str) -> Result<Value> {
    let response = request.send().await.map_err(|e| {
        let kind = if e.is_timeout() {
            "request timed out"
        } else if e.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        TickerError::network(symbol, format!("{}: {}", kind, e))
    })?;

    let status = response.status();
    let url = response.url().clone();
    debug!("GET {} -> {}", url.path(), status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TickerError::network(
            symbol,
            format!("{} returned status {}: {}", url.path(), status, truncate(&body, 200)),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TickerError::network(symbol, format!("failed to read response body: {}", e)))?;

    serde_json::from_str(&body)
        .map_err(|e| TickerError::data_shape(symbol, format!("response is not valid JSON: {}", e)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_with_short_timeout() {
        assert!(HttpClientFactory::create_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_truncate_long_error_bodies() {
        assert_eq!(truncate("  short  ", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
