pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use self::openai::OpenAIChatClient;

/// Provider failure, classified from the raw provider error.
///
/// Quota and rate-limit failures are recoverable by waiting and get converted
/// into user-facing replies further up the chain; only `Unknown` is escalated
/// as a hard failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider quota exhausted: {0}")]
    QuotaExceeded(String),
    #[error("provider rate limited: {0}")]
    RateLimited(String),
    #[error("provider call failed: {0}")]
    Unknown(String),
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Absent key puts the client in degraded mode: a fixed placeholder reply
    /// instead of a provider call.
    pub api_key: Option<String>,
    pub completion_model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
