use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StreamError;

/// One unit of generated content handed to an encoder.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Prose, streamed incrementally.
    Text(String),
    /// Atomic structured payload.
    Part(StructuredPart),
    /// Terminal failure signal.
    Error(String),
}

impl StreamEvent {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn part(part_type: impl Into<String>, data: Value) -> Self {
        Self::Part(StructuredPart::new(part_type, data))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// An opaque payload tagged with a semantic type such as `sources` or `weather`.
///
/// Parts sharing an `id` describe the same UI element at different points in
/// time. Encoders pass them through in order; replacement is up to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredPart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl StructuredPart {
    pub fn new(part_type: impl Into<String>, data: Value) -> Self {
        Self {
            part_type: part_type.into(),
            data,
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<StructuredPart> for StreamEvent {
    fn from(part: StructuredPart) -> Self {
        Self::Part(part)
    }
}

/// Raw JSON items: strings become text, objects with a string `type` become
/// structured parts. Anything else is rejected.
impl TryFrom<Value> for StreamEvent {
    type Error = StreamError;

    fn try_from(value: Value) -> Result<Self, StreamError> {
        match value {
            Value::String(content) => Ok(Self::Text(content)),
            Value::Object(mut map) => {
                let part_type = match map.remove("type") {
                    Some(Value::String(part_type)) => part_type,
                    Some(other) => {
                        return Err(StreamError::malformed(format!(
                            "part `type` must be a string, got {}",
                            json_kind(&other)
                        )));
                    }
                    None => return Err(StreamError::malformed("part is missing `type`")),
                };
                let id = match map.remove("id") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(id)) => Some(id),
                    Some(other) => {
                        return Err(StreamError::malformed(format!(
                            "part `id` must be a string, got {}",
                            json_kind(&other)
                        )));
                    }
                };
                let data = map.remove("data").unwrap_or(Value::Null);
                Ok(Self::Part(StructuredPart {
                    part_type,
                    data,
                    id,
                }))
            }
            other => Err(StreamError::malformed(format!(
                "expected a string or an object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_becomes_text() {
        let event = StreamEvent::try_from(json!("hello")).unwrap();
        assert_eq!(event, StreamEvent::text("hello"));
    }

    #[test]
    fn test_object_becomes_part() {
        let event = StreamEvent::try_from(json!({
            "id": "e1",
            "type": "event",
            "data": {"status": "pending"}
        }))
        .unwrap();

        match event {
            StreamEvent::Part(part) => {
                assert_eq!(part.part_type, "event");
                assert_eq!(part.id.as_deref(), Some("e1"));
                assert_eq!(part.data, json!({"status": "pending"}));
            }
            _ => panic!("Expected Part event"),
        }
    }

    #[test]
    fn test_part_without_data_defaults_to_null() {
        let event = StreamEvent::try_from(json!({"type": "ping"})).unwrap();
        assert_eq!(event, StreamEvent::part("ping", Value::Null));
    }

    #[test]
    fn test_malformed_items_are_rejected() {
        for value in [
            json!(42),
            json!(null),
            json!(true),
            json!(["a", "b"]),
            json!({"data": {}}),
            json!({"type": 7}),
            json!({"type": "weather", "id": 3}),
        ] {
            let err = StreamEvent::try_from(value.clone()).unwrap_err();
            assert!(
                matches!(err, StreamError::MalformedEvent(_)),
                "{} should be malformed",
                value
            );
        }
    }

    #[test]
    fn test_part_serializes_without_absent_id() {
        let part = StructuredPart::new("sources", json!({"nodes": []}));
        assert_eq!(
            serde_json::to_string(&part).unwrap(),
            r#"{"type":"sources","data":{"nodes":[]}}"#
        );

        let part = part.with_id("s1");
        assert_eq!(
            serde_json::to_string(&part).unwrap(),
            r#"{"type":"sources","data":{"nodes":[]},"id":"s1"}"#
        );
    }
}
