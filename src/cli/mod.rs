use clap::Parser;

/// Configuration for the relay server process.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerArgs {
    /// Port for the relay server to listen on.
    #[arg(long, env = "PORT", default_value = "5001")]
    pub port: u16,

    /// API key for the chat completion provider. When absent the server runs
    /// in degraded mode and answers with a fixed placeholder reply.
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// Model name for chat completion.
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    /// Base URL for the chat completion provider API.
    #[arg(long, env = "CHAT_BASE_URL", default_value = "https://api.openai.com")]
    pub chat_base_url: String,

    /// Upper bound in seconds on a single provider call. Expiry is treated
    /// as an unclassified provider failure.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,
}

/// Configuration for the terminal chat client.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ChatArgs {
    /// Base URL of the saga relay server.
    #[arg(long, env = "SAGA_SERVER_URL", default_value = "http://127.0.0.1:5001")]
    pub server_url: String,

    /// Tone profile for replies (friendly, tutor, professional).
    #[arg(long, env = "SAGA_TONE", default_value = "friendly")]
    pub tone: String,

    /// Path of the conversation history file.
    #[arg(long, env = "SAGA_HISTORY_PATH", default_value = ".saga_history.json")]
    pub history_path: String,
}
