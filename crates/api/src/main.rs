use std::{env, sync::Arc};

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info};

use common::logger;
use common::models::DataQuality;
use market_data::remote::BinanceClient;
use market_data::services::{HistoryService, synthetic_history};
use strategy::remote::DeepSeekClient;
use strategy::services::SignalService;

mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::setup_logger();
    dotenv().ok();

    let api_key = env::var("DEEPSEEK_API_KEY").context("DEEPSEEK_API_KEY not set in .env")?;
    let history_years: u32 = env::var("HISTORY_YEARS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let provider = Arc::new(DeepSeekClient::new(api_key));
    let state = Arc::new(AppState::new(SignalService::new(provider)));

    // Load history after binding so /health answers during the fetch.
    let loader_state = state.clone();
    tokio::spawn(async move {
        info!("Fetching {} year(s) of historical BTC data...", history_years);
        let service = HistoryService::new(BinanceClient::new());

        match service.fetch_historical(history_years).await {
            Ok(candles) => {
                loader_state
                    .install_history(candles, DataQuality::Real)
                    .await;
            }
            Err(e) => {
                error!(
                    "Historical fetch failed: {:#}. Falling back to synthetic data.",
                    e
                );
                loader_state
                    .install_history(synthetic_history(history_years), DataQuality::Synthetic)
                    .await;
            }
        }
    });

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Serving signal API on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
