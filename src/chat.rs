//! One tutor exchange: history in, completion out, history updated
//!
//! Each call holds the session's lock from the history read until the new
//! exchange is stored, so concurrent requests for one session run back to back.
//! The user turn and the reply are stored together or not at all.

use crate::conversation::{ConversationStore, SessionLocks, StoreError, Turn};
use crate::llm::{CompletionRequest, LlmError, LlmService};
use crate::prompt::{self, SystemPrompt};
use crate::reply::{self, TutorReply};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Completion failed: {0}")]
    Completion(#[from] LlmError),
    #[error("Conversation store failed: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates store, prompt assembly, completion and normalization
pub struct ChatService {
    store: Arc<dyn ConversationStore>,
    llm: Arc<dyn LlmService>,
    prompt: SystemPrompt,
    temperature: f32,
    locks: SessionLocks,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        llm: Arc<dyn LlmService>,
        prompt: SystemPrompt,
        temperature: f32,
    ) -> Self {
        Self {
            store,
            llm,
            prompt,
            temperature,
            locks: SessionLocks::new(),
        }
    }

    pub fn prompt(&self) -> &SystemPrompt {
        &self.prompt
    }

    /// Run one exchange for `session_id`. On error the session is left untouched.
    #[tracing::instrument(skip(self, input), fields(input_len = input.len()))]
    pub async fn respond(&self, session_id: &str, input: &str) -> Result<TutorReply, ChatError> {
        let _guard = self.locks.acquire(session_id).await;

        let history = self.store.get_or_create(session_id).await?;
        let request = CompletionRequest {
            messages: prompt::assemble(self.prompt.text(), &history, input),
            temperature: Some(self.temperature),
            max_tokens: None,
        };

        let completion = self.llm.complete(&request).await?;

        let normalized = reply::normalize(&completion.text);
        if !normalized.is_parsed() {
            tracing::warn!(
                raw_len = completion.text.len(),
                "Completion did not match reply schema, returning plain text"
            );
        }
        let reply = normalized.into_reply();

        self.store
            .append_exchange(session_id, Turn::user(input), Turn::assistant(reply.to_json()))
            .await?;

        tracing::debug!(
            history = history.len(),
            actions = reply.actions.len(),
            "Exchange stored"
        );
        Ok(reply)
    }
}
