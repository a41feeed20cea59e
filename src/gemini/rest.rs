use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::parse_interval_ms;
use crate::error::FetchError;
use crate::model::candle::{closes_oldest_first, Candle};

use super::types::GeminiApiErrorResponse;

pub const HOURLY_INTERVAL: &str = "1hr";

/// Unauthenticated client for Gemini's public market data endpoints.
pub struct GeminiRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiRestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let reason = match serde_json::from_str::<GeminiApiErrorResponse>(&body) {
                Ok(err) => err.describe(),
                Err(_) if body.is_empty() => status.to_string(),
                Err(_) => body,
            };
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// All symbols listed on the exchange.
    pub async fn get_symbols(&self) -> Result<Vec<String>, FetchError> {
        let url = format!("{}/v1/symbols", self.base_url);
        let symbols: Vec<String> = self.get_json(&url).await?;
        tracing::debug!(count = symbols.len(), "Fetched symbols");
        Ok(symbols)
    }

    /// Candles for `pair` in the order the exchange returns them (newest first).
    pub async fn get_candles(&self, pair: &str, interval: &str) -> Result<Vec<Candle>, FetchError> {
        let url = format!("{}/v2/candles/{}/{}", self.base_url, pair, interval);
        let rows: Vec<Vec<Value>> = self.get_json(&url).await?;
        rows.iter().map(|row| Candle::from_row(row)).collect()
    }

    /// Closing prices of the newest `limit` candles, oldest first.
    pub async fn get_closes(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<f64>, FetchError> {
        let candles = self.get_candles(pair, interval).await?;
        if let Ok(interval_ms) = parse_interval_ms(interval) {
            let gaps = count_gaps(&candles, interval_ms);
            if gaps > 0 {
                tracing::warn!(pair, interval, gaps, "Candle series has gaps");
            }
        }
        let closes = closes_oldest_first(&candles, limit);
        tracing::debug!(
            pair,
            interval,
            fetched = candles.len(),
            kept = closes.len(),
            "Fetched closing prices"
        );
        Ok(closes)
    }

    pub async fn get_hourly_closes(
        &self,
        pair: &str,
        total_hours: usize,
    ) -> Result<Vec<f64>, FetchError> {
        self.get_closes(pair, HOURLY_INTERVAL, total_hours).await
    }
}

/// Number of adjacent candle pairs further apart than one interval.
fn count_gaps(candles: &[Candle], interval_ms: u64) -> usize {
    let mut times: Vec<u64> = candles.iter().map(|c| c.time).collect();
    times.sort_unstable();
    times
        .windows(2)
        .filter(|w| w[1].saturating_sub(w[0]) > interval_ms)
        .count()
}
