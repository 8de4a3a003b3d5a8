use crate::llm::{ ChatClient, ProviderError };
use crate::models::chat::{ ChatRequest, ChatResponse };
use crate::prompt;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error, warn };

const LIVENESS_TEXT: &str = "Saga backend is alive (Rust relay, OpenAI connected)";

// Quota and rate-limit failures are "SAGA needs a moment", not application
// errors. They go back through the success channel in persona.
const QUOTA_REPLY: &str =
    "I’ve used up my thinking budget for now. Give me a little while and ask again—I’ll be here.";
const RATE_LIMIT_REPLY: &str =
    "I’m getting a lot of questions at once. Give me a few seconds and try that again.";

const UPSTREAM_ERROR: &str = "Something went wrong talking to the AI.";

#[derive(Clone)]
struct AppState {
    relay: Arc<dyn ChatClient>,
}

pub fn router(relay: Arc<dyn ChatClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(liveness_handler))
        .route("/api/message", post(message_handler))
        .layer(cors)
        .with_state(AppState { relay })
}

async fn liveness_handler() -> &'static str {
    LIVENESS_TEXT
}

/// The stateless gateway: validate the body, assemble the prompt, relay it,
/// normalize the outcome. Classified quota/rate-limit failures return 200
/// with a reply; only unclassified failures become a 500.
async fn message_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<ChatResponse>) {
    let request = match ChatRequest::from_value(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ChatResponse::Error { error: e.to_string() }),
            );
        }
    };

    info!(
        "Incoming message ({} chars, {} history turns, tone {})",
        request.message.len(),
        request.history.len(),
        request.tone.as_str()
    );

    let prompt_text = prompt::build_prompt(request.tone, &request.history, &request.message);

    match state.relay.complete(&prompt_text).await {
        Ok(completion) => (
            StatusCode::OK,
            Json(ChatResponse::Reply { reply: completion.response.trim().to_string() }),
        ),
        Err(ProviderError::QuotaExceeded(msg)) => {
            warn!("Provider quota exhausted: {}", msg);
            (StatusCode::OK, Json(ChatResponse::Reply { reply: QUOTA_REPLY.to_string() }))
        }
        Err(ProviderError::RateLimited(msg)) => {
            warn!("Provider rate limited: {}", msg);
            (StatusCode::OK, Json(ChatResponse::Reply { reply: RATE_LIMIT_REPLY.to_string() }))
        }
        Err(ProviderError::Unknown(msg)) => {
            error!("Error in /api/message: {}", msg);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse::Error { error: UPSTREAM_ERROR.to_string() }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionResponse;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicUsize, Ordering };
    use tower::ServiceExt;

    enum FakeBehavior {
        Reply(&'static str),
        Quota,
        RateLimited,
        Fail,
    }

    struct FakeRelay {
        behavior: FakeBehavior,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeRelay {
        fn new(behavior: FakeBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChatClient for FakeRelay {
        async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match self.behavior {
                FakeBehavior::Reply(reply) =>
                    Ok(CompletionResponse { response: reply.to_string() }),
                FakeBehavior::Quota =>
                    Err(ProviderError::QuotaExceeded("quota exhausted".to_string())),
                FakeBehavior::RateLimited =>
                    Err(ProviderError::RateLimited("slow down".to_string())),
                FakeBehavior::Fail => Err(ProviderError::Unknown("boom".to_string())),
            }
        }
    }

    async fn post_message(relay: Arc<FakeRelay>, body: Value) -> (StatusCode, Value) {
        let app = router(relay);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/message")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap()
            ).await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn liveness_returns_nonempty_text() {
        let app = router(FakeRelay::new(FakeBehavior::Reply("hi")));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn valid_message_returns_trimmed_reply() {
        let relay = FakeRelay::new(FakeBehavior::Reply("  recursion is self-reference  "));
        let body = json!({ "message": "What is recursion?", "tone": "tutor" });
        let (status, payload) = post_message(relay.clone(), body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!({ "reply": "recursion is self-reference" }));

        // The assembled prompt carries the literal message text.
        let prompt = relay.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("What is recursion?"));
    }

    #[tokio::test]
    async fn history_is_replayed_into_the_prompt() {
        let relay = FakeRelay::new(FakeBehavior::Reply("ok"));
        let body = json!({
            "message": "go on",
            "history": [
                { "role": "user", "content": "what is big-O?" },
                { "role": "assistant", "content": "a growth bound" }
            ]
        });
        let (status, _) = post_message(relay.clone(), body).await;

        assert_eq!(status, StatusCode::OK);
        let prompt = relay.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("User: what is big-O?"));
        assert!(prompt.contains("SAGA: a growth bound"));
    }

    #[tokio::test]
    async fn empty_message_is_a_400_with_an_error_body() {
        let relay = FakeRelay::new(FakeBehavior::Reply("unused"));
        let (status, payload) = post_message(relay.clone(), json!({ "message": "" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload.get("error").and_then(Value::as_str).is_some());
        assert!(payload.get("reply").is_none());
        // Validation failures never reach the relay.
        assert_eq!(relay.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_message_is_a_400() {
        let relay = FakeRelay::new(FakeBehavior::Reply("unused"));
        let (status, payload) = post_message(relay, json!({ "tone": "pro" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload, json!({ "error": "Missing or invalid 'message' field" }));
    }

    #[tokio::test]
    async fn quota_failure_is_a_200_reply_not_an_error() {
        let relay = FakeRelay::new(FakeBehavior::Quota);
        let (status, payload) = post_message(relay, json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::OK);
        let reply = payload.get("reply").and_then(Value::as_str).unwrap();
        assert!(!reply.is_empty());
        assert!(payload.get("error").is_none());
    }

    #[tokio::test]
    async fn rate_limit_failure_is_a_200_reply() {
        let relay = FakeRelay::new(FakeBehavior::RateLimited);
        let (status, payload) = post_message(relay, json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::OK);
        assert!(payload.get("reply").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn unclassified_failure_is_a_500_with_an_error_body() {
        let relay = FakeRelay::new(FakeBehavior::Fail);
        let (status, payload) = post_message(relay, json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(payload.get("error").and_then(Value::as_str).is_some());
        assert!(payload.get("reply").is_none());
    }
}
