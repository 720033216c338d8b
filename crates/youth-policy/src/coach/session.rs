use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for coach conversations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("sess-{id:06}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// One user's conversation. The transcript only grows; it is never read back
/// into scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    started_at: DateTime<Utc>,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: next_session_id(),
            started_at: Utc::now(),
            transcript: Vec::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn push(&mut self, role: ChatRole, text: impl Into<String>) {
        self.transcript.push(ChatTurn {
            role,
            text: text.into(),
            at: Utc::now(),
        });
    }

    /// Appends turns recorded elsewhere, keeping their timestamps.
    pub fn extend(&mut self, turns: impl IntoIterator<Item = ChatTurn>) {
        self.transcript.extend(turns);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage abstraction for sessions so hosts can choose their own backing.
pub trait SessionStore: Send + Sync {
    fn insert(&self, session: ChatSession) -> Result<ChatSession, SessionError>;
    /// Appends `turns` to the stored transcript in one step. Concurrent turns on
    /// the same session must never overwrite each other.
    fn append(&self, id: &SessionId, turns: Vec<ChatTurn>) -> Result<(), SessionError>;
    fn fetch(&self, id: &SessionId) -> Result<Option<ChatSession>, SessionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
