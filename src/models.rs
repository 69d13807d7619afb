use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a chat request.
///
/// `parts` are raw items replayed after the query: strings are text, objects
/// are structured parts. They are validated only when the encoder reaches them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub parts: Vec<Value>,
}

impl ChatRequest {
    /// Text of the last message, or an empty string.
    pub fn query(&self) -> String {
        self.messages
            .last()
            .and_then(ChatMessage::text)
            .unwrap_or_default()
    }
}

/// A chat message as sent by either client generation: older clients put the
/// text in `content`, newer ones in a list of typed `parts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            parts: vec![],
        }
    }

    pub fn text(&self) -> Option<String> {
        self.content
            .clone()
            .or_else(|| self.parts.first().and_then(|p| p.text.clone()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "type", default)]
    pub part_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_from_content() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"messages": [{"role": "user", "content": "first"}, {"role": "user", "content": "second"}]}"#,
        )
        .unwrap();
        assert_eq!(request.query(), "second");
        assert!(request.parts.is_empty());
    }

    #[test]
    fn test_query_from_parts() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"messages": [{"role": "user", "parts": [{"type": "text", "text": "weather?"}]}]}"#,
        )
        .unwrap();
        assert_eq!(request.query(), "weather?");
    }

    #[test]
    fn test_query_defaults_to_empty() {
        assert_eq!(ChatRequest::default().query(), "");

        let request: ChatRequest =
            serde_json::from_str(r#"{"messages": [{"role": "user", "parts": []}]}"#).unwrap();
        assert_eq!(request.query(), "");
    }

    #[test]
    fn test_parts_are_kept_raw() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"messages": [], "parts": ["text", {"type": "sources", "data": {}}, 3]}"#,
        )
        .unwrap();
        assert_eq!(request.parts.len(), 3);
    }
}
