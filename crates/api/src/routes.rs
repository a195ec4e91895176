//! REST surface of the signal service.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service banner |
//! | `GET` | `/health` | Liveness and readiness info |
//! | `GET` | `/signal/next` | Generate and evaluate the next signal |
//! | `GET` | `/signal/reset` | Rewind the cursor to the start |
//! | `GET` | `/signal/current` | Cursor position and data stats |

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use common::models::{DataQuality, TradeEvaluation, TradeSignal};
use market_data::services::{CHUNK_SIZE, EVALUATION_HOURS, chunk};
use strategy::services::evaluate_trade;

use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/signal/next", get(next_signal))
        .route("/signal/reset", get(reset_cursor))
        .route("/signal/current", get(current_status))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ErrorResponse { detail: msg.into() }))
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
    status: &'static str,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "BTC Trading Signal Generator API",
        status: "active",
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    data_points: usize,
    current_index: usize,
    service_initialized: bool,
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let history = state.history.read().await;
    let cursor = state.cursor.lock().await;

    Json(HealthResponse {
        status: "healthy",
        data_points: history.as_ref().map_or(0, |h| h.candles.len()),
        current_index: *cursor,
        service_initialized: history.is_some(),
    })
}

#[derive(Debug, Serialize)]
struct NextSignalResponse {
    current_index: usize,
    entry_timestamp: String,
    entry_price: f64,
    signal_data: TradeSignal,
    evaluation: TradeEvaluation,
    next_index: usize,
}

/// Generate a signal for the chunk at the cursor, replay it against the
/// following closes, and advance the cursor.
async fn next_signal(State(state): State<SharedState>) -> impl IntoResponse {
    let history = state.history.read().await;
    let Some(history) = history.as_ref() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Service not initialized yet")
            .into_response();
    };
    let candles = &history.candles;

    let mut cursor = state.cursor.lock().await;

    // Wrap around once there is no longer room for a chunk plus its
    // evaluation window.
    if *cursor + CHUNK_SIZE + EVALUATION_HOURS >= candles.len() {
        *cursor = 0;
    }

    let Some(window) = chunk(candles, *cursor, CHUNK_SIZE) else {
        return error_response(StatusCode::BAD_REQUEST, "Not enough data").into_response();
    };

    // The signal is computed "as of" the previous bar: the newest candle in
    // the chunk is withheld from the prompt and the entry executes at the
    // close of the bar before it.
    let context = &window[..CHUNK_SIZE - 1];
    let signal = state.signal_service.generate(context).await;

    let entry = &window[CHUNK_SIZE - 2];
    let entry_price = entry.close_price;

    let future_start = *cursor + CHUNK_SIZE - 1;
    let future_end = (future_start + EVALUATION_HOURS).min(candles.len());
    let future_closes: Vec<f64> = candles[future_start..future_end]
        .iter()
        .map(|c| c.close_price)
        .collect();

    let mut evaluation = evaluate_trade(&signal, entry_price, &future_closes, EVALUATION_HOURS);
    evaluation.pnl_percent = (evaluation.pnl_percent * 100.0).round() / 100.0;

    let current_index = *cursor;
    *cursor += 1;

    Json(NextSignalResponse {
        current_index,
        entry_timestamp: entry.open_time_utc(),
        entry_price,
        signal_data: signal,
        evaluation,
        next_index: current_index + 1,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    message: &'static str,
    current_index: usize,
}

async fn reset_cursor(State(state): State<SharedState>) -> Json<ResetResponse> {
    let mut cursor = state.cursor.lock().await;
    *cursor = 0;

    Json(ResetResponse {
        message: "Index reset to 0",
        current_index: *cursor,
    })
}

#[derive(Debug, Serialize)]
struct CurrentStatusResponse {
    current_index: usize,
    total_candles: usize,
    remaining_candles: usize,
    data_quality: Option<DataQuality>,
}

async fn current_status(State(state): State<SharedState>) -> Json<CurrentStatusResponse> {
    let history = state.history.read().await;
    let cursor = state.cursor.lock().await;

    let total_candles = history.as_ref().map_or(0, |h| h.candles.len());

    Json(CurrentStatusResponse {
        current_index: *cursor,
        total_candles,
        remaining_candles: total_candles.saturating_sub(*cursor),
        data_quality: history.as_ref().map(|h| h.quality),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use common::models::Candle;
    use strategy::services::SignalService;
    use strategy::traits::SignalProvider;

    struct StubProvider(String);

    #[async_trait]
    impl SignalProvider for StubProvider {
        async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
            Ok(self.0.clone())
        }
    }

    fn test_state(reply: &str) -> SharedState {
        let provider = Arc::new(StubProvider(reply.to_string()));
        Arc::new(AppState::new(SignalService::new(provider)))
    }

    /// Hourly candles whose close rises by one unit per bar, starting at 100.
    fn rising_candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle {
                    open_time: 1_700_000_400_000 + i as i64 * 3_600_000,
                    close_time: 1_700_000_400_000 + (i as i64 + 1) * 3_600_000 - 1,
                    open_price: close - 1.0,
                    high_price: close + 1.0,
                    low_price: close - 2.0,
                    close_price: close,
                    volume: 1_000.0,
                    no_of_trades: 40_000,
                }
            })
            .collect()
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn next_signal_is_503_before_history_loads() {
        let state = test_state("{\"signal\": \"HOLD\"}");
        let app = router(state.clone());

        let (status, body) = get_json(app, "/signal/next").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["detail"], "Service not initialized yet");

        let (status, body) = get_json(router(state), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service_initialized"], false);
        assert_eq!(body["data_points"], 0);
    }

    #[tokio::test]
    async fn full_signal_cycle_with_take_profit() {
        // Entry at candle index 49 (close 149); closes rise past the target.
        let reply = "{\"signal\": \"BUY\", \"stop_price\": 140.0, \
                     \"target_price\": 160.0, \"confidence\": 80, \"reason\": \"up only\"}";
        let state = test_state(reply);
        state
            .install_history(rising_candles(100), DataQuality::Real)
            .await;

        let (status, body) = get_json(router(state.clone()), "/signal/next").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_index"], 0);
        assert_eq!(body["next_index"], 1);
        assert_eq!(body["entry_price"], 149.0);
        assert_eq!(body["signal_data"]["signal"], "BUY");
        assert_eq!(body["evaluation"]["outcome"], "TAKE_PROFIT");
        assert_eq!(body["evaluation"]["profitable"], true);
        assert_eq!(body["evaluation"]["pnl_percent"], 7.38);
        assert_eq!(body["evaluation"]["evaluation_period_hours"], 24);

        // Cursor advanced.
        let (_, body) = get_json(router(state), "/signal/current").await;
        assert_eq!(body["current_index"], 1);
        assert_eq!(body["total_candles"], 100);
        assert_eq!(body["remaining_candles"], 99);
        assert_eq!(body["data_quality"], "real");
    }

    #[tokio::test]
    async fn hold_reply_yields_hold_evaluation() {
        let state = test_state("no trade today, sorry");
        state
            .install_history(rising_candles(100), DataQuality::Synthetic)
            .await;

        let (status, body) = get_json(router(state), "/signal/next").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signal_data"]["signal"], "HOLD");
        assert_eq!(body["signal_data"]["confidence"], 50);
        assert_eq!(body["evaluation"]["outcome"], "HOLD");
        assert_eq!(body["evaluation"]["pnl_percent"], 0.0);
    }

    #[tokio::test]
    async fn cursor_wraps_when_tail_is_too_short() {
        let state = test_state("{\"signal\": \"HOLD\"}");
        state
            .install_history(rising_candles(80), DataQuality::Synthetic)
            .await;
        *state.cursor.lock().await = 10; // 10 + 75 >= 80, must wrap

        let (status, body) = get_json(router(state), "/signal/next").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_index"], 0);
        assert_eq!(body["next_index"], 1);
    }

    #[tokio::test]
    async fn reset_rewinds_the_cursor() {
        let state = test_state("{\"signal\": \"HOLD\"}");
        state
            .install_history(rising_candles(100), DataQuality::Real)
            .await;
        *state.cursor.lock().await = 5;

        let (status, body) = get_json(router(state.clone()), "/signal/reset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_index"], 0);
        assert_eq!(*state.cursor.lock().await, 0);
    }

    #[tokio::test]
    async fn current_status_before_load_has_null_quality() {
        let state = test_state("{\"signal\": \"HOLD\"}");
        let (status, body) = get_json(router(state), "/signal/current").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_candles"], 0);
        assert!(body["data_quality"].is_null());
    }

    #[tokio::test]
    async fn root_banner() {
        let state = test_state("{\"signal\": \"HOLD\"}");
        let (status, body) = get_json(router(state), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");
    }
}
