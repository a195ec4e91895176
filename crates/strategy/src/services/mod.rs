pub mod evaluator;
pub mod signal_service;

pub use evaluator::evaluate_trade;
pub use signal_service::SignalService;
