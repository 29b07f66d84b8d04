//! Tutor instruction text and prompt assembly
//!
//! The persona, teaching style and reply format all live in the instruction
//! text, which ships as a versioned asset under `prompts/`. Two variants exist:
//! markdown-formatted replies (the default) and HTML-formatted replies. Either
//! can be replaced wholesale by a file at startup.

use crate::conversation::{Role, Turn};
use crate::llm::{ChatMessage, ChatRole};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Revision of the built-in instruction texts, logged at startup
pub const PROMPT_VERSION: &str = "finsense-tutor-2025.08";

/// Stored turns replayed to the model on each request
pub const HISTORY_WINDOW: usize = 8;

const MARKDOWN_PROMPT: &str = include_str!("../prompts/tutor_markdown.md");
const HTML_PROMPT: &str = include_str!("../prompts/tutor_html.md");

/// Which formatting the model is told to use inside `text`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptVariant {
    #[default]
    Markdown,
    Html,
}

impl PromptVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptVariant::Markdown => "markdown",
            PromptVariant::Html => "html",
        }
    }

    /// Sampling temperature used when none is configured
    pub fn default_temperature(self) -> f32 {
        match self {
            PromptVariant::Markdown => 1.0,
            PromptVariant::Html => 0.7,
        }
    }

    /// Whether reply text may carry raw HTML through to the browser
    pub fn allows_raw_html(self) -> bool {
        matches!(self, PromptVariant::Html)
    }

    fn builtin_text(self) -> &'static str {
        match self {
            PromptVariant::Markdown => MARKDOWN_PROMPT,
            PromptVariant::Html => HTML_PROMPT,
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(PromptVariant::Markdown),
            "html" => Ok(PromptVariant::Html),
            other => Err(format!(
                "Unknown prompt variant '{other}' (expected 'markdown' or 'html')"
            )),
        }
    }
}

/// The fixed instruction sent ahead of every conversation
#[derive(Debug, Clone)]
pub struct SystemPrompt {
    variant: PromptVariant,
    text: String,
    /// `None` for the built-in text
    source: Option<String>,
}

impl SystemPrompt {
    pub fn builtin(variant: PromptVariant) -> Self {
        Self {
            variant,
            text: variant.builtin_text().trim_end().to_string(),
            source: None,
        }
    }

    /// Load replacement instruction text from `path`
    pub fn from_file(variant: PromptVariant, path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read system prompt {}: {e}", path.display()))?;
        if text.trim().is_empty() {
            return Err(format!("System prompt {} is empty", path.display()));
        }
        Ok(Self {
            variant,
            text: text.trim_end().to_string(),
            source: Some(path.display().to_string()),
        })
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Version tag for logs: the built-in revision or the override's path
    pub fn version(&self) -> &str {
        self.source.as_deref().unwrap_or(PROMPT_VERSION)
    }
}

/// Build the completion payload: instruction, the last [`HISTORY_WINDOW`]
/// stored turns in order, then the new user input.
pub fn assemble(system: &str, history: &[Turn], input: &str) -> Vec<ChatMessage> {
    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];

    let mut messages = Vec::with_capacity(recent.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(recent.iter().map(|turn| {
        let role = match turn.role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        ChatMessage::new(role, turn.content.clone())
    }));
    messages.push(ChatMessage::user(input));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn history(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("t{i}"))
                } else {
                    Turn::assistant(format!("t{i}"))
                }
            })
            .collect()
    }

    #[test]
    fn test_assemble_empty_history() {
        let messages = assemble("sys", &[], "set_level_beginner");
        assert_eq!(
            messages,
            vec![
                ChatMessage::system("sys"),
                ChatMessage::user("set_level_beginner")
            ]
        );
    }

    #[test]
    fn test_assemble_takes_last_eight_turns() {
        let messages = assemble("sys", &history(10), "next");

        assert_eq!(messages.len(), 1 + HISTORY_WINDOW + 1);
        assert_eq!(messages[0].role, ChatRole::System);
        // t0 and t1 fall outside the window
        assert_eq!(messages[1], ChatMessage::user("t2"));
        assert_eq!(messages[2], ChatMessage::assistant("t3"));
        assert_eq!(messages[8], ChatMessage::assistant("t9"));
        assert_eq!(messages[9], ChatMessage::user("next"));
    }

    #[test]
    fn test_assemble_short_history_is_kept_whole() {
        let messages = assemble("sys", &history(3), "next");
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["sys", "t0", "t1", "t2", "next"]);
    }

    #[test]
    fn test_builtin_variants() {
        let markdown = SystemPrompt::builtin(PromptVariant::Markdown);
        assert!(markdown.text().starts_with("You are FinSense"));
        assert!(markdown.text().contains("set_level_beginner"));
        assert_eq!(markdown.version(), PROMPT_VERSION);

        let html = SystemPrompt::builtin(PromptVariant::Html);
        assert!(html.text().contains("<b>"));
        assert!(html.variant().allows_raw_html());
        assert!(!markdown.variant().allows_raw_html());
    }

    #[test]
    fn test_variant_temperatures() {
        assert!((PromptVariant::Markdown.default_temperature() - 1.0).abs() < f32::EPSILON);
        assert!((PromptVariant::Html.default_temperature() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("Markdown".parse::<PromptVariant>(), Ok(PromptVariant::Markdown));
        assert_eq!(" html ".parse::<PromptVariant>(), Ok(PromptVariant::Html));
        assert!("rtf".parse::<PromptVariant>().is_err());
    }

    #[test]
    fn test_prompt_file_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "You are a terse budgeting coach.").unwrap();

        let prompt = SystemPrompt::from_file(PromptVariant::Markdown, file.path()).unwrap();
        assert_eq!(prompt.text(), "You are a terse budgeting coach.");
        assert_eq!(prompt.version(), file.path().display().to_string());
    }

    #[test]
    fn test_empty_prompt_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = SystemPrompt::from_file(PromptVariant::Html, file.path()).unwrap_err();
        assert!(err.contains("empty"));
    }
}
