use log::warn;
use reqwest::header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE };
use reqwest::{ Client as HttpClient, StatusCode };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

use super::{ ChatClient, CompletionResponse, LlmConfig, ProviderError };
use async_trait::async_trait;

/// Degraded-mode reply used when no provider credential is configured.
/// Returned through the success channel, not as an error.
pub const NOT_CONFIGURED_REPLY: &str =
    "SAGA: The AI key is not configured on the server yet.";

const SYSTEM_MESSAGE: &str =
    "You are SAGA, a friendly AI explainer that makes any topic clear and approachable.";

// Fixed sampling parameters; no per-request tuning.
const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.7;

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorBody,
}

#[derive(Deserialize, Default)]
struct OpenAIErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        base_url: String,
        request_timeout: std::time::Duration,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            api_key,
            model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(
            config.api_key.clone(),
            config.completion_model.clone(),
            config.base_url.clone(),
            config.request_timeout,
        )
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("No provider credential configured, returning the placeholder reply");
            return Ok(CompletionResponse { response: NOT_CONFIGURED_REPLY.to_string() });
        };

        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage { role: "system".to_string(), content: SYSTEM_MESSAGE.to_string() },
                OpenAIMessage { role: "user".to_string(), content: prompt.to_string() }
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let resp = self.http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&req)
            .send().await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Unknown(format!("request timed out: {}", e))
                } else {
                    ProviderError::Unknown(format!("request failed: {}", e))
                }
            })?;

        let status = resp.status();
        let body = resp
            .text().await
            .map_err(|e| ProviderError::Unknown(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_provider_error(status, &body));
        }

        let parsed: OpenAIResponse = serde_json
            ::from_str(&body)
            .map_err(|e| ProviderError::Unknown(format!("failed to parse response: {}", e)))?;

        // No candidates yields an empty string, never an error, so callers
        // can trim unconditionally.
        let content = parsed.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(CompletionResponse { response: content })
    }
}

/// Maps a non-success provider response onto the error taxonomy by
/// inspecting the HTTP status and the error object's `code`/`type` field.
/// The provider reports exhausted quota with the same 429 status it uses for
/// rate limiting, so the code check comes first.
pub fn classify_provider_error(status: StatusCode, body: &str) -> ProviderError {
    let error = serde_json
        ::from_str::<OpenAIErrorResponse>(body)
        .map(|resp| resp.error)
        .unwrap_or_default();

    let code = error.code.as_deref().or(error.kind.as_deref()).unwrap_or("");
    let message = if error.message.is_empty() {
        body.to_string()
    } else {
        error.message.clone()
    };

    if code == "insufficient_quota" {
        ProviderError::QuotaExceeded(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || code == "rate_limit_exceeded" {
        ProviderError::RateLimited(message)
    } else {
        ProviderError::Unknown(format!("HTTP {}: {}", status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quota_body() -> String {
        serde_json::json!({
            "error": {
                "message": "You exceeded your current quota, please check your plan and billing details.",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        }).to_string()
    }

    #[test]
    fn quota_code_classifies_as_quota_exceeded() {
        let err = classify_provider_error(StatusCode::TOO_MANY_REQUESTS, &quota_body());
        assert!(matches!(err, ProviderError::QuotaExceeded(_)));
    }

    #[test]
    fn plain_429_classifies_as_rate_limited() {
        let body = serde_json::json!({
            "error": {
                "message": "Rate limit reached for gpt-4o-mini",
                "type": "requests",
                "code": "rate_limit_exceeded"
            }
        }).to_string();
        let err = classify_provider_error(StatusCode::TOO_MANY_REQUESTS, &body);
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[test]
    fn status_429_without_parsable_body_is_rate_limited() {
        let err = classify_provider_error(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests");
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[test]
    fn server_errors_classify_as_unknown() {
        let err = classify_provider_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(err, ProviderError::Unknown(_)));

        let err = classify_provider_error(StatusCode::UNAUTHORIZED, "{\"error\":{\"message\":\"bad key\"}}");
        assert!(matches!(err, ProviderError::Unknown(_)));
    }

    #[tokio::test]
    async fn missing_credential_returns_placeholder_without_calling_out() {
        // Port 9 (discard) is not listening; any attempted call would error.
        let client = OpenAIChatClient::new(
            None,
            "gpt-4o-mini".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(1),
        ).unwrap();

        let completion = client.complete("explain recursion").await.unwrap();
        assert_eq!(completion.response, NOT_CONFIGURED_REPLY);
    }
}
