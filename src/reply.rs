//! Tutor reply normalization
//!
//! The model is instructed to answer with `{"text": ..., "actions": [...]}` but
//! nothing enforces it. Completions are parsed strictly; anything that does not
//! fit becomes a plain-text reply with no actions. This boundary never fails.

use serde::{Deserialize, Serialize};

/// Shown when the model returned nothing usable
pub const FALLBACK_TEXT: &str = "Sorry, I could not process that.";

/// A suggested follow-up: `label` is shown, `value` is sent back as input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub label: String,
    pub value: String,
}

impl Action {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Normalized reply returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorReply {
    pub text: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl TutorReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            actions: Vec::new(),
        }
    }

    /// Serialized form stored as the assistant turn
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.text.clone())
    }
}

/// Outcome of parsing a completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedReply {
    /// Completion matched the reply schema
    Parsed(TutorReply),
    /// Completion text as returned, which did not match
    Unparsed(String),
}

impl NormalizedReply {
    pub fn is_parsed(&self) -> bool {
        matches!(self, NormalizedReply::Parsed(_))
    }

    pub fn into_reply(self) -> TutorReply {
        match self {
            NormalizedReply::Parsed(reply) => reply,
            NormalizedReply::Unparsed(raw) if raw.trim().is_empty() => {
                TutorReply::plain(FALLBACK_TEXT)
            }
            NormalizedReply::Unparsed(raw) => TutorReply::plain(raw),
        }
    }
}

/// Parse completion text against the reply schema
pub fn normalize(raw: &str) -> NormalizedReply {
    match serde_json::from_str::<TutorReply>(strip_code_fence(raw)) {
        Ok(reply) => NormalizedReply::Parsed(reply),
        Err(e) => {
            if !raw.trim().is_empty() {
                tracing::debug!(error = %e, "Completion is not a structured reply");
            }
            NormalizedReply::Unparsed(raw.to_string())
        }
    }
}

/// Remove a single markdown code fence wrapping the whole text
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match body.split_once('\n') {
        Some((info, inner)) if !info.contains('{') => inner.trim(),
        _ => body.trim(),
    }
}
