//! Server configuration read once at startup

use crate::prompt::PromptVariant;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;

/// Listener, storage and prompt settings. Completion settings live in
/// [`crate::llm::LlmConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// SQLite file; `None` keeps conversations in memory
    pub db_path: Option<PathBuf>,
    pub prompt_variant: PromptVariant,
    /// Replaces the variant's built-in instruction text
    pub system_prompt_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: None,
            prompt_variant: PromptVariant::default(),
            system_prompt_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        if let Some(raw) = get("FINSENSE_PORT") {
            config.port = raw
                .trim()
                .parse()
                .map_err(|e| format!("Invalid FINSENSE_PORT '{raw}': {e}"))?;
        }
        if let Some(raw) = get("FINSENSE_PROMPT_VARIANT") {
            config.prompt_variant = raw.parse()?;
        }
        config.db_path = get("FINSENSE_DB_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        config.system_prompt_file = get("FINSENSE_SYSTEM_PROMPT_FILE")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}
