use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use common::models::{Candle, TradeSignal};

use crate::traits::SignalProvider;

const SYSTEM_PROMPT: &str = "You are an expert cryptocurrency trading analyst. \
Analyze OHLC data and provide clear trading signals with proper risk management.";

/// Turns a window of candles into a structured trading signal via the
/// configured AI provider. Provider failures degrade to HOLD instead of
/// surfacing as errors.
pub struct SignalService {
    provider: Arc<dyn SignalProvider>,
}

impl SignalService {
    pub fn new(provider: Arc<dyn SignalProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate(&self, candles: &[Candle]) -> TradeSignal {
        let prompt = format_prompt(candles);

        match self.provider.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => match extract_signal(&text) {
                Some(signal) => {
                    debug!("Parsed AI signal: {:?} (confidence {})", signal.signal, signal.confidence);
                    signal
                }
                None => {
                    warn!("Failed to parse JSON out of AI response");
                    TradeSignal::fallback_hold("Could not parse AI response, defaulting to HOLD")
                }
            },
            Err(e) => {
                warn!("AI provider call failed: {:#}", e);
                TradeSignal::fallback_hold("API request failed, defaulting to HOLD")
            }
        }
    }
}

/// User prompt carrying the OHLCV window as pretty-printed JSON.
pub fn format_prompt(candles: &[Candle]) -> String {
    let rows: Vec<serde_json::Value> = candles
        .iter()
        .map(|c| {
            json!({
                "timestamp": c.open_time_utc(),
                "open": c.open_price,
                "high": c.high_price,
                "low": c.low_price,
                "close": c.close_price,
                "volume": c.volume,
            })
        })
        .collect();

    format!(
        "Analyze the following BTC/USDT hourly OHLC data and generate a trading signal.\n\
         Respond with a JSON object containing: signal (BUY|SELL|HOLD), stop_price, target_price,\n\
         confidence (0-100), and reason.\n\n\
         OHLC Data (most recent last):\n{}\n\n\
         Important: Consider technical analysis, price action, volume patterns, and market structure.\n\
         Provide realistic stop and target prices based on support/resistance levels.",
        serde_json::to_string_pretty(&rows).unwrap_or_default()
    )
}

/// Models tend to wrap the JSON object in prose or code fences; take the
/// outermost braces and try to parse what is between them.
pub fn extract_signal(text: &str) -> Option<TradeSignal> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::SignalSide;

    use crate::traits::MockSignalProvider;

    fn sample_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                open_time: 1_700_000_400_000 + i as i64 * 3_600_000,
                close_time: 1_700_000_400_000 + (i as i64 + 1) * 3_600_000 - 1,
                open_price: 36_000.0 + i as f64,
                high_price: 36_100.0 + i as f64,
                low_price: 35_900.0 + i as f64,
                close_price: 36_050.0 + i as f64,
                volume: 1_000.0,
                no_of_trades: 40_000,
            })
            .collect()
    }

    #[test]
    fn extracts_signal_from_chatty_completion() {
        let text = "Sure! Based on the data, here is my analysis:\n\
            ```json\n{\"signal\": \"SELL\", \"stop_price\": 37000.0, \
            \"target_price\": 35000.0, \"confidence\": 64, \
            \"reason\": \"lower highs\"}\n```\nTrade carefully.";
        let signal = extract_signal(text).unwrap();
        assert_eq!(signal.signal, SignalSide::Sell);
        assert_eq!(signal.target_price, Some(35_000.0));
    }

    #[test]
    fn extraction_rejects_garbage() {
        assert!(extract_signal("no json here at all").is_none());
        assert!(extract_signal("} backwards {").is_none());
        assert!(extract_signal("{\"signal\": \"MAYBE\"}").is_none());
    }

    #[test]
    fn prompt_lists_bars_most_recent_last() {
        let prompt = format_prompt(&sample_candles(3));
        assert!(prompt.contains("most recent last"));
        let first = prompt.find("2023-11-14 22:20:00");
        assert!(first.is_some(), "expected formatted timestamps in prompt");
    }

    #[tokio::test]
    async fn generate_returns_parsed_signal() {
        let mut provider = MockSignalProvider::new();
        provider.expect_complete().returning(|_, _| {
            Ok("{\"signal\": \"BUY\", \"stop_price\": 35500.0, \
                \"target_price\": 37500.0, \"confidence\": 80, \"reason\": \"breakout\"}"
                .to_string())
        });

        let service = SignalService::new(Arc::new(provider));
        let signal = service.generate(&sample_candles(50)).await;
        assert_eq!(signal.signal, SignalSide::Buy);
        assert_eq!(signal.confidence, 80);
    }

    #[tokio::test]
    async fn generate_degrades_to_hold_on_provider_error() {
        let mut provider = MockSignalProvider::new();
        provider
            .expect_complete()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));

        let service = SignalService::new(Arc::new(provider));
        let signal = service.generate(&sample_candles(50)).await;
        assert_eq!(signal.signal, SignalSide::Hold);
        assert_eq!(signal.confidence, 50);
    }

    #[tokio::test]
    async fn generate_degrades_to_hold_on_unparseable_reply() {
        let mut provider = MockSignalProvider::new();
        provider
            .expect_complete()
            .returning(|_, _| Ok("I cannot advise on trades.".to_string()));

        let service = SignalService::new(Arc::new(provider));
        let signal = service.generate(&sample_candles(50)).await;
        assert_eq!(signal.signal, SignalSide::Hold);
    }
}
