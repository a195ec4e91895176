pub mod history_service;

pub use history_service::{CHUNK_SIZE, EVALUATION_HOURS, HistoryService, chunk, synthetic_history};
