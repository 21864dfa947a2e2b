//! @ai:module:intent Pull the structured {expression, result} payload out of a model sample
//! @ai:module:layer application
//! @ai:module:public_api extract_payload, extract_output_text, ModelSample
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Plain string fields consulted, in order, when `output_text` is absent.
const TEXT_FIELDS: [&str; 3] = ["text", "content", "output"];

/// @ai:intent A model response as delivered by the evaluation service
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSample(Value);

impl ModelSample {
    /// @ai:intent Wrap an arbitrary sample mapping
    /// @ai:effects pure
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// @ai:intent Sample whose output is free text expected to hold JSON
    /// @ai:effects pure
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("output_text".to_string(), Value::String(text.into()));
        Self(Value::Object(map))
    }

    /// @ai:intent Sample carrying an already structured output
    /// @ai:effects pure
    pub fn from_json(output: Value) -> Self {
        let mut map = Map::new();
        map.insert("output_json".to_string(), output);
        Self(Value::Object(map))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ModelSample {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// @ai:intent Locate the model's output text through the fallback chain
///            output_text, then text/content/output, then choices[0].message.content
/// @ai:effects pure
pub fn extract_output_text(sample: &Value) -> Option<&str> {
    if let Some(text) = sample.get("output_text").and_then(Value::as_str) {
        return Some(text);
    }

    for field in TEXT_FIELDS {
        if let Some(text) = sample.get(field).and_then(Value::as_str) {
            return Some(text);
        }
    }

    sample
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
}

/// @ai:intent Extract the non-empty JSON object the model produced
/// @ai:post Ok holds a non-empty object
/// @ai:effects pure
pub fn extract_payload(sample: &Value) -> Result<Map<String, Value>> {
    let payload = match sample.get("output_json") {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(Value::String(text)) => parse_json_object(text),
        Some(_) => None,
        None => extract_output_text(sample).and_then(parse_json_object),
    };

    match payload {
        Some(map) if !map.is_empty() => Ok(map),
        _ => Err(Error::MalformedPayload),
    }
}

/// @ai:intent Parse text that is, as a whole, a JSON object
/// @ai:pre prose around the object or markdown fences make the text unparseable
/// @ai:effects pure
fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    as_object(text.trim())
}

fn as_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_json_takes_precedence() {
        let sample = json!({
            "output_json": {"expression": "1+2", "result": "3"},
            "output_text": "{\"expression\": \"9\", \"result\": \"9\"}"
        });
        let payload = extract_payload(&sample).unwrap();
        assert_eq!(payload["expression"], "1+2");
    }

    #[test]
    fn test_output_text_must_be_json() {
        let sample = json!({"output_text": "I think the answer is 24"});
        assert!(matches!(extract_payload(&sample), Err(Error::MalformedPayload)));
    }

    #[test]
    fn test_empty_object_is_malformed() {
        assert!(extract_payload(&json!({"output_json": {}})).is_err());
        assert!(extract_payload(&json!({"output_json": null})).is_err());
        assert!(extract_payload(&json!({})).is_err());
    }

    #[test]
    fn test_fallback_text_fields() {
        let sample = json!({"content": "{\"expression\": \"2*3\", \"result\": 6}"});
        assert_eq!(extract_payload(&sample).unwrap()["result"], 6);

        let chat = json!({
            "choices": [{"message": {"content": "{\"expression\": \"2*3\", \"result\": 6}"}}]
        });
        assert_eq!(extract_payload(&chat).unwrap()["expression"], "2*3");
    }

    #[test]
    fn test_json_embedded_in_prose_is_malformed() {
        let fenced = json!({
            "output_text": "Here you go:\n```json\n{\"expression\": \"4*6\", \"result\": \"24\"}\n```"
        });
        assert!(matches!(extract_payload(&fenced), Err(Error::MalformedPayload)));

        let inline = json!({
            "output_text": "Sure! {\"expression\": \"4*9-10-2\", \"result\": \"24\"} hope that helps"
        });
        assert!(matches!(extract_payload(&inline), Err(Error::MalformedPayload)));
    }

    #[test]
    fn test_surrounding_whitespace_is_allowed() {
        let sample = json!({"output_text": "\n  {\"expression\": \"4*6\", \"result\": \"24\"}\n"});
        assert_eq!(extract_payload(&sample).unwrap()["expression"], "4*6");
    }

    #[test]
    fn test_output_json_may_be_encoded_string() {
        let sample = json!({"output_json": "{\"expression\": \"1+1\", \"result\": 2}"});
        assert_eq!(extract_payload(&sample).unwrap()["result"], 2);
    }
}
