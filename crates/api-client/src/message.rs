//! Human-readable messages from error bodies.

use serde_json::Value;

/// Longest plain-text body shown verbatim.
const MAX_TEXT_MESSAGE: usize = 500;

/// Extract a message from an error response body.
///
/// The body may be JSON, plain text, or a binary download (CSV export
/// failures) that happens to contain JSON.
pub(crate) fn extract_message(body: &[u8], status: u16) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(message) = message_from_json(&value) {
            return message;
        }
    } else if !text.is_empty() && text.len() < MAX_TEXT_MESSAGE {
        return text.to_string();
    }

    format!("Request failed with status code {status}")
}

fn message_from_json(value: &Value) -> Option<String> {
    let obj = match value {
        Value::Object(obj) => obj,
        Value::String(s) if !s.is_empty() => return Some(s.clone()),
        _ => return None,
    };

    for key in ["error", "detail", "message"] {
        if let Some(msg) = obj.get(key).and_then(first_string) {
            return Some(msg);
        }
    }
    if let Some(msg) = obj.get("non_field_errors").and_then(first_string) {
        return Some(msg);
    }

    // Field validation errors: {"email": ["already registered"]}
    obj.iter()
        .find_map(|(field, v)| first_string(v).map(|msg| format!("{field}: {msg}")))
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(first_string),
        _ => None,
    }
}
