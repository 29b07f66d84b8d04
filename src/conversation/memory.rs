//! Process-local conversation store

use super::{ConversationStore, StoreResult, Turn, MAX_RETAINED_TURNS};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// In-memory store; all sessions are lost on restart
#[derive(Default)]
pub struct InMemoryStore {
    sessions: Mutex<HashMap<String, VecDeque<Turn>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push turns under a single lock, then evict from the front
    fn push(&self, session_id: &str, new_turns: impl IntoIterator<Item = Turn>) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.extend(new_turns);
        while turns.len() > MAX_RETAINED_TURNS {
            turns.pop_front();
        }
    }

    /// Number of sessions created so far
    #[cfg(test)]
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn get_or_create(&self, session_id: &str) -> StoreResult<Vec<Turn>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let turns = sessions.entry(session_id.to_string()).or_default();
        Ok(turns.iter().cloned().collect())
    }

    async fn append(&self, session_id: &str, turn: Turn) -> StoreResult<()> {
        self.push(session_id, [turn]);
        Ok(())
    }

    async fn append_exchange(
        &self,
        session_id: &str,
        user: Turn,
        assistant: Turn,
    ) -> StoreResult<()> {
        self.push(session_id, [user, assistant]);
        Ok(())
    }
}
