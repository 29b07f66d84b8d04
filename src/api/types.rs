//! API request and response types

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat` as sent by the page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub chat_input: Option<String>,
}

/// A chat request with both required fields present and non-empty
#[derive(Debug, PartialEq, Eq)]
pub struct ValidChatRequest {
    pub session_id: String,
    pub chat_input: String,
}

impl ChatRequest {
    /// Parse a raw body; `None` when it is not JSON of the expected shape or a
    /// required field is missing or empty
    pub fn parse(body: &[u8]) -> Option<ValidChatRequest> {
        let req: ChatRequest = serde_json::from_slice(body).ok()?;
        let session_id = req.session_id.filter(|s| !s.is_empty())?;
        let chat_input = req.chat_input.filter(|s| !s.is_empty())?;
        Some(ValidChatRequest {
            session_id,
            chat_input,
        })
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_request() {
        let parsed = ChatRequest::parse(br#"{"sessionId":"local_test_abc","chatInput":"set_level_beginner"}"#);
        assert_eq!(
            parsed,
            Some(ValidChatRequest {
                session_id: "local_test_abc".to_string(),
                chat_input: "set_level_beginner".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_missing_empty_or_mistyped_fields() {
        let bodies: [&[u8]; 8] = [
            br#"{"chatInput":"hi"}"#,
            br#"{"sessionId":"s1"}"#,
            br#"{"sessionId":"","chatInput":"hi"}"#,
            br#"{"sessionId":"s1","chatInput":""}"#,
            br#"{"sessionId":7,"chatInput":"hi"}"#,
            br#"{"sessionId":null,"chatInput":"hi"}"#,
            b"not json",
            b"",
        ];
        for body in bodies {
            assert_eq!(ChatRequest::parse(body), None, "{}", String::from_utf8_lossy(body));
        }
    }
}
