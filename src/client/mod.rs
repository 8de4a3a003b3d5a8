pub mod dispatch;
pub mod store;

use crate::models::chat::{ ChatResponse, Tone, Turn };
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::json;
use std::error::Error as StdError;
use thiserror::Error;

/// Client-observed failure of a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed: connection refused, DNS, timeout.
    #[error("could not reach the relay server: {0}")]
    Network(String),
    /// The server answered with a structured error body (400 or 500).
    #[error("the relay server rejected the request: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait RelayGateway: Send + Sync {
    async fn send_message(
        &self,
        message: &str,
        tone: Tone,
        history: &[Turn]
    ) -> Result<String, GatewayError>;
}

pub struct HttpRelayGateway {
    http: HttpClient,
    base_url: String,
}

impl HttpRelayGateway {
    pub fn new(base_url: String) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let http = HttpClient::builder()
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl RelayGateway for HttpRelayGateway {
    async fn send_message(
        &self,
        message: &str,
        tone: Tone,
        history: &[Turn]
    ) -> Result<String, GatewayError> {
        let url = format!("{}/api/message", self.base_url.trim_end_matches('/'));
        let body = json!({
            "message": message,
            "provider": "openai",
            "tone": tone.as_str(),
            "history": history,
        });

        let resp = self.http
            .post(&url)
            .json(&body)
            .send().await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let payload = resp
            .json::<ChatResponse>().await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        match payload {
            ChatResponse::Reply { reply } => Ok(reply),
            ChatResponse::Error { error } => Err(GatewayError::Rejected(error)),
        }
    }
}
