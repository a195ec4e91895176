use std::env;

pub mod binance_client;
pub mod error;
pub mod kline_response;

pub use binance_client::BinanceClient;
pub use error::FetchError;
pub use kline_response::RestKline;

pub fn get_rest_base_url() -> String {
    env::var("BINANCE_BASE_URL").unwrap_or_else(|_| "https://api.binance.com".to_string())
}
