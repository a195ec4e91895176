use async_trait::async_trait;

/// Seam between signal generation and whichever chat-completions backend
/// produces the analysis text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Run one chat completion and return the raw assistant text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;
}
