use common::models::{SignalSide, TradeEvaluation, TradeOutcome, TradeSignal};

/// Replay a signal against the hourly closes that followed its entry bar.
///
/// Stop and target are checked in close order, stop first within a bar. If
/// neither level is touched inside the horizon the position is marked to
/// market against the last close actually available.
pub fn evaluate_trade(
    signal: &TradeSignal,
    entry_price: f64,
    future_closes: &[f64],
    horizon_hours: usize,
) -> TradeEvaluation {
    let period = horizon_hours.min(future_closes.len());

    if signal.signal == SignalSide::Hold {
        return TradeEvaluation {
            profitable: false,
            outcome: TradeOutcome::Hold,
            pnl_percent: 0.0,
            evaluation_period_hours: period,
        };
    }

    for &close in &future_closes[..period] {
        match signal.signal {
            SignalSide::Buy => {
                if let Some(stop) = signal.stop_price {
                    if close <= stop {
                        return stopped_out(entry_price, stop, true, period);
                    }
                }
                if let Some(target) = signal.target_price {
                    if close >= target {
                        return target_hit(entry_price, target, true, period);
                    }
                }
            }
            SignalSide::Sell => {
                if let Some(stop) = signal.stop_price {
                    if close >= stop {
                        return stopped_out(entry_price, stop, false, period);
                    }
                }
                if let Some(target) = signal.target_price {
                    if close <= target {
                        return target_hit(entry_price, target, false, period);
                    }
                }
            }
            SignalSide::Hold => unreachable!(),
        }
    }

    // Neither level hit: exit at the end of the window.
    let pnl_percent = match future_closes[..period].last() {
        Some(&final_close) => directional_pnl(entry_price, final_close, signal.signal == SignalSide::Buy),
        None => 0.0,
    };

    TradeEvaluation {
        profitable: pnl_percent > 0.0,
        outcome: TradeOutcome::ExitAtEnd,
        pnl_percent,
        evaluation_period_hours: period,
    }
}

fn directional_pnl(entry: f64, exit: f64, long: bool) -> f64 {
    if long {
        (exit - entry) / entry * 100.0
    } else {
        (entry - exit) / entry * 100.0
    }
}

fn stopped_out(entry: f64, stop: f64, long: bool, period: usize) -> TradeEvaluation {
    TradeEvaluation {
        profitable: false,
        outcome: TradeOutcome::StopLoss,
        pnl_percent: directional_pnl(entry, stop, long),
        evaluation_period_hours: period,
    }
}

fn target_hit(entry: f64, target: f64, long: bool, period: usize) -> TradeEvaluation {
    TradeEvaluation {
        profitable: true,
        outcome: TradeOutcome::TakeProfit,
        pnl_percent: directional_pnl(entry, target, long),
        evaluation_period_hours: period,
    }
}
