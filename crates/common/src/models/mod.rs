pub mod candle;
pub mod evaluation;
pub mod signal;

pub use candle::{Candle, DataQuality};
pub use evaluation::{TradeEvaluation, TradeOutcome};
pub use signal::{SignalSide, TradeSignal};
