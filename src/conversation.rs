//! Session-scoped conversation buffer
//!
//! Each session keeps a bounded, chronologically ordered list of turns. The
//! store is injected behind [`ConversationStore`]: in-memory by default,
//! SQLite-backed when a database path is configured.

mod locks;
mod memory;
mod sqlite;

pub use locks::SessionLocks;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on turns retained per session; older turns are evicted first
pub const MAX_RETAINED_TURNS: usize = 10;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt turn role in storage: {0}")]
    CorruptRole(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(StoreError::CorruptRole(other.to_string())),
        }
    }
}

/// One role-tagged message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Storage for per-session turn history
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Turns for `session_id` in chronological order; creates the session on first use
    async fn get_or_create(&self, session_id: &str) -> StoreResult<Vec<Turn>>;

    /// Append a turn, evicting from the front past [`MAX_RETAINED_TURNS`]
    #[allow(dead_code)] // Chat cycles write whole exchanges
    async fn append(&self, session_id: &str, turn: Turn) -> StoreResult<()>;

    /// Append a user turn and the reply to it, evicting from the front past
    /// [`MAX_RETAINED_TURNS`]. Either both turns are stored or neither is.
    async fn append_exchange(
        &self,
        session_id: &str,
        user: Turn,
        assistant: Turn,
    ) -> StoreResult<()>;
}

#[async_trait]
impl<T: ConversationStore + ?Sized> ConversationStore for Arc<T> {
    async fn get_or_create(&self, session_id: &str) -> StoreResult<Vec<Turn>> {
        (**self).get_or_create(session_id).await
    }

    async fn append(&self, session_id: &str, turn: Turn) -> StoreResult<()> {
        (**self).append(session_id, turn).await
    }

    async fn append_exchange(
        &self,
        session_id: &str,
        user: Turn,
        assistant: Turn,
    ) -> StoreResult<()> {
        (**self).append_exchange(session_id, user, assistant).await
    }
}
