//! Completion client configuration

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-5-mini-2025-08-07";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration for the OpenAI-compatible completion client
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub model: String,
    /// Overrides the prompt variant's default temperature
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();

        // Gateway mode: the gateway authenticates, so the key is implicit
        if let Some(gateway) = get("LLM_GATEWAY") {
            config.base_url = format!("{}/openai/v1", gateway.trim_end_matches('/'));
            config.api_key = Some("implicit".to_string());
        } else {
            if let Some(base) = get("OPENAI_BASE_URL") {
                config.base_url = base.trim_end_matches('/').to_string();
            }
            config.api_key = get("OPENAI_API_KEY").filter(|k| !k.is_empty());
        }

        if let Some(model) = get("FINSENSE_MODEL") {
            config.model = model;
        }
        if let Some(raw) = get("FINSENSE_TEMPERATURE") {
            let temperature: f32 = raw
                .parse()
                .map_err(|e| format!("Invalid FINSENSE_TEMPERATURE '{raw}': {e}"))?;
            config.temperature = Some(temperature);
        }
        if let Some(raw) = get("FINSENSE_MAX_TOKENS") {
            let max: u32 = raw
                .parse()
                .map_err(|e| format!("Invalid FINSENSE_MAX_TOKENS '{raw}': {e}"))?;
            config.max_tokens = Some(max);
        }
        if let Some(raw) = get("FINSENSE_LLM_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .map_err(|e| format!("Invalid FINSENSE_LLM_TIMEOUT_SECS '{raw}': {e}"))?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
