use crate::models::chat::{ Conversation, Turn };
use log::warn;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Owns the conversation and its durable copy on disk.
///
/// Every mutation rewrites the whole snapshot through a temp-file rename, so
/// the file is always either absent or a well-formed conversation; there is
/// no incremental persistence.
pub struct ConversationStore {
    path: PathBuf,
    conversation: Conversation,
}

impl ConversationStore {
    /// Restores prior state from disk. Absence or malformed content falls
    /// back to the seeded default conversation; a bad file never fails
    /// startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let conversation = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Conversation>(&contents) {
                Ok(conversation) if !conversation.turns.is_empty() => conversation,
                Ok(_) => Conversation::seeded(),
                Err(e) => {
                    warn!("Discarding malformed history file {}: {}", path.display(), e);
                    Conversation::seeded()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Conversation::seeded(),
            Err(e) => {
                warn!("Could not read history file {}: {}", path.display(), e);
                Conversation::seeded()
            }
        };
        Self { path, conversation }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn append(&mut self, turn: Turn) -> io::Result<()> {
        self.conversation.turns.push(turn);
        self.persist()
    }

    /// Reseeds the default greeting. The only way turns are ever removed.
    pub fn reset(&mut self) -> io::Result<()> {
        self.conversation = Conversation::seeded();
        self.persist()
    }

    fn persist(&self) -> io::Result<()> {
        let snapshot = serde_json
            ::to_string_pretty(&self.conversation)
            .map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, snapshot)?;
        fs::rename(&tmp, &self.path)
    }
}
