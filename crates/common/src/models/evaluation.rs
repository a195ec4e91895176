use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeOutcome {
    Hold,
    StopLoss,
    TakeProfit,
    ExitAtEnd,
}

/// Result of replaying a signal against the closes that followed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEvaluation {
    pub profitable: bool,
    pub outcome: TradeOutcome,
    pub pnl_percent: f64,
    pub evaluation_period_hours: usize,
}
