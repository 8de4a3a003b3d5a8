use super::store::ConversationStore;
use super::{ GatewayError, RelayGateway };
use crate::models::chat::{ Conversation, Tone, Turn };
use log::warn;
use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };
use tokio::sync::Mutex;

// Fixed instruction strings the derived intents submit in place of typed text.
pub const SIMPLER_INSTRUCTION: &str =
    "Explain your last answer again, but simpler, like I’m completely new to the topic.";
pub const EXAMPLE_INSTRUCTION: &str =
    "Give me a concrete real-world example of what you just explained.";
pub const DEEPER_INSTRUCTION: &str =
    "Go deeper on your last answer. Add more detail and the next layer of nuance.";
pub const SUMMARIZE_INSTRUCTION: &str =
    "Summarize our conversation so far in a few short bullet points.";

pub const NETWORK_FAILURE_REPLY: &str =
    "Oops, something went wrong talking to the server. Check your connection or try again in a bit.";
pub const REJECTED_REPLY: &str =
    "Sorry, I hit a snag answering that. Give it another try in a moment?";
pub const EMPTY_REPLY_FALLBACK: &str =
    "Hmm, I couldn’t come up with anything. Try asking in a slightly different way?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    Send(String),
    ExplainSimpler,
    GiveAnExample,
    GoDeeper,
    Summarize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The intent ran to completion; carries the new assistant turn's text.
    Completed(String),
    /// A request is already in flight; the intent was dropped, nothing changed.
    Busy,
    /// The intent's precondition did not hold; a no-op, not an error.
    Skipped,
}

/// Turns user intents into gateway calls and conversation mutations.
///
/// State machine over one flag: idle / in-flight. Only idle accepts an
/// intent; there is no queueing and no cancellation. Every accepted intent
/// appends the user turn optimistically, then exactly one assistant turn on
/// any outcome, and always returns to idle.
pub struct DispatchController {
    store: Mutex<ConversationStore>,
    gateway: Arc<dyn RelayGateway>,
    tone: Mutex<Tone>,
    in_flight: AtomicBool,
}

impl DispatchController {
    pub fn new(store: ConversationStore, gateway: Arc<dyn RelayGateway>, tone: Tone) -> Self {
        Self {
            store: Mutex::new(store),
            gateway,
            tone: Mutex::new(tone),
            in_flight: AtomicBool::new(false),
        }
    }

    pub async fn tone(&self) -> Tone {
        *self.tone.lock().await
    }

    pub async fn set_tone(&self, tone: Tone) {
        *self.tone.lock().await = tone;
    }

    pub async fn conversation(&self) -> Conversation {
        self.store.lock().await.conversation().clone()
    }

    pub async fn reset(&self) {
        let mut store = self.store.lock().await;
        if let Err(e) = store.reset() {
            warn!("Could not rewrite the history file: {}", e);
        }
    }

    pub async fn dispatch(&self, intent: Intent) -> DispatchOutcome {
        if self.in_flight.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
            return DispatchOutcome::Busy;
        }
        let outcome = self.run(intent).await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    async fn run(&self, intent: Intent) -> DispatchOutcome {
        let message = {
            let store = self.store.lock().await;
            let conversation = store.conversation();
            // Refining needs something to refine; summarizing needs turns.
            let can_refine = conversation.has_assistant_turn();
            match &intent {
                Intent::Send(text) => {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        return DispatchOutcome::Skipped;
                    }
                    trimmed.to_string()
                }
                Intent::ExplainSimpler if can_refine => SIMPLER_INSTRUCTION.to_string(),
                Intent::GiveAnExample if can_refine => EXAMPLE_INSTRUCTION.to_string(),
                Intent::GoDeeper if can_refine => DEEPER_INSTRUCTION.to_string(),
                Intent::Summarize if !conversation.turns.is_empty() => {
                    SUMMARIZE_INSTRUCTION.to_string()
                }
                _ => {
                    return DispatchOutcome::Skipped;
                }
            }
        };

        // Optimistic append: the user turn is visible (and persisted) before
        // the reply arrives. The gateway call carries the updated history.
        let history = {
            let mut store = self.store.lock().await;
            if let Err(e) = store.append(Turn::user(message.as_str())) {
                warn!("Could not rewrite the history file: {}", e);
            }
            store.conversation().turns.clone()
        };

        let tone = self.tone().await;
        let reply = match self.gateway.send_message(&message, tone, &history).await {
            Ok(reply) => {
                let trimmed = reply.trim();
                if trimmed.is_empty() {
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(GatewayError::Rejected(error)) => {
                warn!("Relay rejected the request: {}", error);
                REJECTED_REPLY.to_string()
            }
            Err(GatewayError::Network(error)) => {
                warn!("Could not reach the relay server: {}", error);
                NETWORK_FAILURE_REPLY.to_string()
            }
        };

        {
            let mut store = self.store.lock().await;
            if let Err(e) = store.append(Turn::assistant(reply.as_str())) {
                warn!("Could not rewrite the history file: {}", e);
            }
        }

        DispatchOutcome::Completed(reply)
    }
}
