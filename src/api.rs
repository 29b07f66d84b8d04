//! HTTP API for FinSense
//!
//! Serves the chat page, its static assets and `POST /api/chat`.

mod assets;
mod handlers;
pub mod render;
mod types;

pub use handlers::create_router;

use crate::chat::ChatService;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>) -> Self {
        Self { chat }
    }

    /// Whether replies may carry raw HTML into the page
    pub fn allows_raw_html(&self) -> bool {
        self.chat.prompt().variant().allows_raw_html()
    }
}
