use serde::{ Serialize, Deserialize };
use serde_json::Value;
use thiserror::Error;

/// Default greeting shown when a conversation starts from scratch.
pub const GREETING: &str =
    "Hey, I’m SAGA 👋 Text me any topic and I’ll break it down for you—clearly, simply, and conversationally.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Appended, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    /// Lenient parse of a history entry off the wire. The conversation is a
    /// closed two-party exchange, so any role other than "user" counts as the
    /// assistant. Entries without string content are dropped.
    pub fn from_wire(value: &Value) -> Option<Self> {
        let content = value.get("content")?.as_str()?.to_string();
        let role = match value.get("role").and_then(Value::as_str) {
            Some("user") => Role::User,
            _ => Role::Assistant,
        };
        Some(Self { role, content })
    }
}

/// Ordered turn sequence. Non-empty after initialization: a fresh
/// conversation is seeded with the SAGA greeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn seeded() -> Self {
        Self { turns: vec![Turn::assistant(GREETING)] }
    }

    pub fn has_assistant_turn(&self) -> bool {
        self.turns.iter().any(|turn| turn.role == Role::Assistant)
    }
}

/// Named instruction profile for the assistant persona's register.
///
/// `friendly`, `tutor` and `professional` are canonical. Earlier revisions of
/// the wire protocol used `pro` and `study_buddy`; those are accepted as
/// aliases. Everything else falls back to `friendly`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Tutor,
    Professional,
}

impl Tone {
    pub fn from_param(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tutor" | "study_buddy" => Tone::Tutor,
            "professional" | "pro" => Tone::Professional,
            _ => Tone::Friendly,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Tutor => "tutor",
            Tone::Professional => "professional",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing or invalid 'message' field")]
    InvalidMessage,
}

/// Validated form of the inbound request body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub tone: Tone,
    pub history: Vec<Turn>,
}

impl ChatRequest {
    /// Parses the raw JSON body into a typed request at the boundary.
    ///
    /// `message` must be a non-empty string. `tone` is optional and also
    /// accepted under its legacy field name `style`; `history` is optional
    /// and parsed leniently. The `provider` field is accepted and ignored
    /// since only one provider is wired up.
    pub fn from_value(body: &Value) -> Result<Self, RequestError> {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .ok_or(RequestError::InvalidMessage)?
            .to_string();

        let tone = body
            .get("tone")
            .or_else(|| body.get("style"))
            .and_then(Value::as_str)
            .map(Tone::from_param)
            .unwrap_or_default();

        let history = body
            .get("history")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(Turn::from_wire).collect())
            .unwrap_or_default();

        Ok(Self { message, tone, history })
    }
}

/// Outbound response body: a reply or an error, never both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Reply { reply: String },
    Error { error: String },
}
