use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use common::models::{Candle, DataQuality};
use strategy::services::SignalService;

/// The loaded candle series plus where it came from.
pub struct MarketHistory {
    pub candles: Vec<Candle>,
    pub quality: DataQuality,
}

/// Shared across all handlers. The history slot stays empty until the
/// startup loader finishes; the cursor serializes `/signal/next` callers.
pub struct AppState {
    pub history: RwLock<Option<MarketHistory>>,
    pub cursor: Mutex<usize>,
    pub signal_service: SignalService,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(signal_service: SignalService) -> Self {
        Self {
            history: RwLock::new(None),
            cursor: Mutex::new(0),
            signal_service,
        }
    }

    pub async fn install_history(&self, candles: Vec<Candle>, quality: DataQuality) {
        info!("Installing {} candles ({:?})", candles.len(), quality);
        let mut slot = self.history.write().await;
        *slot = Some(MarketHistory { candles, quality });
    }
}
