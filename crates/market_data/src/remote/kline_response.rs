use serde::Deserialize;

use common::models::Candle;

/// One row of the `/api/v3/klines` response. Binance sends each kline as a
/// positional JSON array of mixed numbers and decimal strings:
/// `[openTime, open, high, low, close, volume, closeTime, quoteVolume,
///   trades, takerBuyBase, takerBuyQuote, ignore]`.
#[derive(Deserialize, Debug)]
pub struct RestKline(
    pub i64,    // open time (ms)
    pub String, // open
    pub String, // high
    pub String, // low
    pub String, // close
    pub String, // volume
    pub i64,    // close time (ms)
    pub String, // quote asset volume
    pub i64,    // number of trades
    pub String, // taker buy base volume
    pub String, // taker buy quote volume
    pub String, // unused
);

impl RestKline {
    pub fn to_candle(&self) -> Candle {
        Candle {
            open_time: self.0,
            close_time: self.6,
            open_price: self.1.parse::<f64>().unwrap_or(0_f64),
            high_price: self.2.parse::<f64>().unwrap_or(0_f64),
            low_price: self.3.parse::<f64>().unwrap_or(0_f64),
            close_price: self.4.parse::<f64>().unwrap_or(0_f64),
            volume: self.5.parse::<f64>().unwrap_or(0_f64),
            no_of_trades: self.8,
        }
    }
}
