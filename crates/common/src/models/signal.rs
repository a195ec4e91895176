use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSide {
    Buy,
    Sell,
    Hold,
}

/// Structured trading signal parsed out of the AI completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub signal: SignalSide,
    #[serde(default)]
    pub stop_price: Option<f64>,
    #[serde(default)]
    pub target_price: Option<f64>,
    #[serde(default)]
    pub confidence: u8, // 0-100
    #[serde(default)]
    pub reason: String,
}

impl TradeSignal {
    /// Default signal when the AI provider fails or replies with garbage.
    pub fn fallback_hold(reason: impl Into<String>) -> Self {
        Self {
            signal: SignalSide::Hold,
            stop_price: None,
            target_price: None,
            confidence: 50,
            reason: reason.into(),
        }
    }
}
