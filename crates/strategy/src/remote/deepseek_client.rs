use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

use crate::remote::get_chat_base_url;
use crate::traits::SignalProvider;

const MODEL: &str = "deepseek-chat";
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 500;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Chat-completions client for the DeepSeek API.
pub struct DeepSeekClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl DeepSeekClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, get_chat_base_url())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("btc-signal-api/0.1.0")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl SignalProvider for DeepSeekClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut attempt = 0;
        let mut last_err = None;

        while attempt < MAX_ATTEMPTS {
            attempt += 1;

            match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: ChatResponse = resp
                        .json()
                        .await
                        .context("Failed to decode DeepSeek response")?;
                    return parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content)
                        .ok_or_else(|| anyhow!("DeepSeek response had no choices"));
                }
                Ok(resp) => {
                    last_err = Some(anyhow!("DeepSeek API error: {}", resp.status()));
                }
                Err(e) => {
                    last_err = Some(anyhow!(e).context("Failed to reach DeepSeek API"));
                }
            }

            // No point backing off once the attempt budget is spent.
            if attempt < MAX_ATTEMPTS {
                let backoff_ms = 100_u64 * 2_u64.pow(attempt);
                warn!(
                    "DeepSeek request failed, retrying in {} ms (attempt {}/{})",
                    backoff_ms, attempt, MAX_ATTEMPTS
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Unknown DeepSeek error")))
    }
}
