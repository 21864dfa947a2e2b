//! @ai:module:intent One raw puzzle record from a JSONL dataset
//! @ai:module:layer domain
//! @ai:module:public_api PuzzleRecord, stringify_value
//! @ai:module:stateless true

use serde_json::{Map, Value};

/// @ai:intent A dataset line: a JSON object with at least `nums` and `target`
///            Extra fields are carried through conversion untouched
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleRecord {
    fields: Map<String, Value>,
}

impl PuzzleRecord {
    /// @ai:effects pure
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// @ai:intent Build a record from a parsed JSON value
    /// @ai:post None unless value is an object
    /// @ai:effects pure
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// @ai:intent Puzzle numbers as a list, whether stored as a list or a JSON-encoded string
    /// @ai:effects pure
    /// @ai:example ({"nums": "[4, 9, 10, 2]"}) -> Some([4, 9, 10, 2])
    pub fn nums(&self) -> Option<Vec<Value>> {
        match self.fields.get("nums")? {
            Value::Array(items) => Some(items.clone()),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }

    /// @ai:intent Whether the puzzle has exactly `arity` numbers
    /// @ai:effects pure
    pub fn has_arity(&self, arity: usize) -> bool {
        self.nums().map(|n| n.len() == arity).unwrap_or(false)
    }

    /// @ai:intent Field rendered for transport; absent fields become ""
    /// @ai:effects pure
    pub fn field_string(&self, key: &str) -> String {
        self.fields.get(key).map(stringify_value).unwrap_or_default()
    }
}

/// @ai:intent Strings verbatim, everything else in the `str()` layout training prompts use
/// @ai:effects pure
/// @ai:example ("42") -> "42"
/// @ai:example ([4, 9]) -> "[4, 9]"
/// @ai:example ({"a": "x"}) -> "{'a': 'x'}"
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => {
            let mut out = String::new();
            render_nested(other, &mut out);
            out
        }
    }
}

fn render_nested(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => quote_into(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_nested(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                quote_into(key, out);
                out.push_str(": ");
                render_nested(item, out);
            }
            out.push('}');
        }
    }
}

/// Single quotes unless the text itself holds one and no double quote.
fn quote_into(text: &str, out: &mut String) {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
