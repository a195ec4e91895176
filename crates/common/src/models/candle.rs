use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One closed hourly bar of BTC/USDT trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,  // epoch ms
    pub close_time: i64, // epoch ms
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
    pub no_of_trades: i64,
}

impl Candle {
    /// Open time rendered the way it is shown in prompts and API responses.
    pub fn open_time_utc(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.open_time)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| self.open_time.to_string())
    }
}

/// Where the loaded history came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Real,
    Synthetic,
}
