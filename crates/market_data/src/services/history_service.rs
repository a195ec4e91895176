use anyhow::{Context, bail};
use chrono::{Duration, Utc};
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, info};

use common::models::Candle;

use crate::remote::BinanceClient;

/// Candles handed to the AI per request: 50 bars of context plus the bar
/// the signal is evaluated from.
pub const CHUNK_SIZE: usize = 51;

/// How many hourly closes a signal is replayed against.
pub const EVALUATION_HOURS: usize = 24;

const SYMBOL: &str = "BTCUSDT";
const INTERVAL: &str = "1h";
const PAGE_LIMIT: u16 = 1000;
const HOUR_MS: i64 = 3_600_000;

/// Assembles the historical hourly BTC/USDT series the service walks over.
pub struct HistoryService {
    client: BinanceClient,
}

impl HistoryService {
    pub fn new(client: BinanceClient) -> Self {
        Self { client }
    }

    /// Fetch `years` of hourly candles ending now, paging forward until the
    /// exchange has nothing more to give.
    pub async fn fetch_historical(&self, years: u32) -> anyhow::Result<Vec<Candle>> {
        let mut since = (Utc::now() - Duration::days(365 * i64::from(years))).timestamp_millis();
        let mut all_candles: Vec<Candle> = Vec::new();

        loop {
            let page = self
                .client
                .fetch_klines(SYMBOL, INTERVAL, since, PAGE_LIMIT)
                .await
                .context("Failed to fetch klines page")?;

            if page.is_empty() {
                break;
            }

            since = page.last().map(|c| c.open_time + 1).unwrap_or(since);
            let full_page = page.len() == usize::from(PAGE_LIMIT);

            debug!("Fetched page of {} candles, cursor now {}", page.len(), since);
            all_candles.extend(page);

            if !full_page {
                break;
            }

            sleep(self.client.request_delay()).await;
        }

        if all_candles.is_empty() {
            bail!("Binance returned no klines for {}", SYMBOL);
        }

        info!("Loaded {} hourly {} candles", all_candles.len(), SYMBOL);
        Ok(all_candles)
    }
}

/// A full-size view starting at `start`, or `None` near the end of the series.
pub fn chunk(candles: &[Candle], start: usize, size: usize) -> Option<&[Candle]> {
    if start + size > candles.len() {
        return None;
    }
    Some(&candles[start..start + size])
}

/// Random-walk stand-in for real history, used when the exchange is
/// unreachable at startup.
pub fn synthetic_history(years: u32) -> Vec<Candle> {
    synthetic_history_with(&mut rand::thread_rng(), years)
}

pub fn synthetic_history_with<R: Rng>(rng: &mut R, years: u32) -> Vec<Candle> {
    let hours = u64::from(years) * 365 * 24;
    let end = Utc::now().timestamp_millis() / HOUR_MS * HOUR_MS;

    let mut candles = Vec::with_capacity(hours as usize);
    let mut open_price = 60_000.0_f64;

    for i in 0..hours as i64 {
        let open_time = end - (hours as i64 - i) * HOUR_MS;
        let step: f64 = rng.gen_range(-0.01..0.01);
        let close_price = open_price * (1.0 + step);

        let wick_up: f64 = rng.gen_range(0.0..0.004);
        let wick_down: f64 = rng.gen_range(0.0..0.004);
        let high_price = open_price.max(close_price) * (1.0 + wick_up);
        let low_price = open_price.min(close_price) * (1.0 - wick_down);

        candles.push(Candle {
            open_time,
            close_time: open_time + HOUR_MS - 1,
            open_price,
            high_price,
            low_price,
            close_price,
            volume: rng.gen_range(200.0..3000.0),
            no_of_trades: rng.gen_range(10_000..80_000),
        });

        open_price = close_price;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn chunk_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let candles = synthetic_history_with(&mut rng, 1);

        assert!(chunk(&candles, 0, CHUNK_SIZE).is_some());
        assert_eq!(chunk(&candles, 10, 5).unwrap().len(), 5);
        assert!(chunk(&candles, candles.len() - 1, 2).is_none());
        assert!(chunk(&candles, candles.len(), 1).is_none());
    }

    #[test]
    fn synthetic_series_is_well_formed() {
        let mut rng = StdRng::seed_from_u64(42);
        let candles = synthetic_history_with(&mut rng, 1);

        assert_eq!(candles.len(), 365 * 24);

        for pair in candles.windows(2) {
            assert_eq!(pair[1].open_time - pair[0].open_time, HOUR_MS);
            // random walk: each bar opens where the previous one closed
            assert_eq!(pair[1].open_price, pair[0].close_price);
        }

        for c in &candles {
            assert!(c.high_price >= c.open_price.max(c.close_price));
            assert!(c.low_price <= c.open_price.min(c.close_price));
            assert!(c.volume > 0.0);
            assert_eq!(c.close_time, c.open_time + HOUR_MS - 1);
        }
    }
}
