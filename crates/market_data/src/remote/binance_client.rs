use std::time::Duration;

use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use common::models::Candle;

use crate::remote::kline_response::RestKline;
use crate::remote::{FetchError, get_rest_base_url};

const MAX_RETRIES: u32 = 3;

/// Thin client over the public (unsigned) Binance spot REST API.
pub struct BinanceClient {
    client: Client,
    base_url: String,
    request_delay_ms: u64,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(get_rest_base_url())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("btc-signal-api/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
            request_delay_ms: 250,
        }
    }

    /// Pause to insert between consecutive paginated requests.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Fetch up to `limit` klines starting at `start_time` (epoch ms).
    /// Rate-limit responses are retried with exponential backoff.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: i64,
        limit: u16,
    ) -> Result<Vec<Candle>, FetchError> {
        let mut retry_count = 0;

        loop {
            match self.make_request(symbol, interval, start_time, limit).await {
                Ok(page) => return Ok(page.iter().map(RestKline::to_candle).collect()),
                Err(e) if e.is_rate_limit() => {
                    retry_count += 1;
                    if retry_count > MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_seconds = 2_u64.pow(retry_count);
                    warn!(
                        "Rate limited fetching {} klines, backing off for {} seconds (attempt {}/{})",
                        symbol, backoff_seconds, retry_count, MAX_RETRIES
                    );
                    sleep(Duration::from_secs(backoff_seconds)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn make_request(
        &self,
        symbol: &str,
        interval: &str,
        start_time: i64,
        limit: u16,
    ) -> Result<Vec<RestKline>, FetchError> {
        let url = format!("{}/api/v3/klines", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval),
                ("startTime", &start_time.to_string()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited);
        }
        if status.as_u16() == 418 {
            return Err(FetchError::IpBanned);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if let Some(used_weight) = response.headers().get("x-mbx-used-weight-1m") {
            if let Ok(used_weight) = used_weight.to_str().unwrap_or("0").parse::<u32>() {
                if used_weight > 1000 {
                    warn!("High API weight usage: {}", used_weight);
                } else {
                    debug!("Used weights: {}/1200", used_weight);
                }
            }
        }

        Ok(response.json::<Vec<RestKline>>().await?)
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}
