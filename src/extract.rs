//! Locates the JSON array embedded in a free-form model reply.
//!
//! The scan takes everything from the first `[` to the last `]`, across
//! lines. It is not JSON-aware: prose with stray brackets, or several
//! bracketed segments, widens the span and usually makes the strict parse
//! below fail. `serde_json` is the correctness gate, not the scan.

use serde_json::Value;

use crate::error::StylistError;

/// Widest `[`..`]` span of `text`, inclusive, if there is one.
pub fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Extracts and strictly parses the array payload of a reply.
pub fn extract_array(raw: &str) -> Result<Vec<Value>, StylistError> {
    let span = bracket_span(raw).ok_or_else(|| StylistError::NoStructuredPayload { raw: raw.to_string() })?;

    let value = serde_json::from_str::<Value>(span)
        .map_err(|e| StylistError::MalformedPayload { reason: e.to_string(), raw: raw.to_string() })?;
    into_array(value, raw)
}

// Valid JSON that is not an array is still unusable here.
fn into_array(value: Value, raw: &str) -> Result<Vec<Value>, StylistError> {
    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(StylistError::MalformedPayload {
            reason: format!("expected a JSON array, found {}", kind_of(&other)),
            raw: raw.to_string(),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
