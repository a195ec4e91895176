use std::env;

pub mod deepseek_client;

pub use deepseek_client::DeepSeekClient;

pub fn get_chat_base_url() -> String {
    env::var("DEEPSEEK_BASE_URL").unwrap_or_else(|_| "https://api.deepseek.com/v1".to_string())
}
