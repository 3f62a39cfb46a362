//! Decoding of the interpreter's response envelope.
//!
//! The backend script prints one JSON document per invocation:
//! `{"success": true, "value": ...}` or `{"success": false, "error": "..."}`.
//! Exit code 0 suggests, but does not guarantee, `success: true` — the
//! caller must check the decoded flag independently.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("missing boolean `success` field")]
    MissingSuccess,
}

/// The structured success/error wrapper around an invocation's output.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub success: bool,
    /// Decoded payload, taken from `value`, `content`, or `data` — the
    /// backend uses different keys per operation.
    pub value: Option<Value>,
    pub error: Option<String>,
}

pub fn decode(payload: &str) -> Result<ResponseEnvelope, EnvelopeError> {
    let document: Value = serde_json::from_str(payload.trim())?;
    let Some(success) = document.get("success").and_then(Value::as_bool) else {
        return Err(EnvelopeError::MissingSuccess);
    };
    let value = ["value", "content", "data"]
        .iter()
        .find_map(|key| document.get(*key))
        .cloned();
    let error = document
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(ResponseEnvelope {
        success,
        value,
        error,
    })
}

/// Render a decoded value for the transcript: bare text for strings,
/// stable-indentation JSON for composite values.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_a_ccget_success() {
        let envelope =
            decode(r#"{"success": true, "property": "natom", "value": [3]}"#).expect("decode");
        assert!(envelope.success);
        assert_eq!(envelope.value, Some(json!([3])));
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn decodes_a_reported_error() {
        let envelope =
            decode(r#"{"success": false, "error": "Property foo not available"}"#).expect("decode");
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Property foo not available"));
    }

    #[test]
    fn content_key_is_accepted_for_exports() {
        let envelope = decode(r#"{"success": true, "format": "xyz", "content": "3\n\nH 0 0 0"}"#)
            .expect("decode");
        assert_eq!(envelope.value, Some(json!("3\n\nH 0 0 0")));
    }

    #[test]
    fn garbage_is_a_decode_error_not_a_reported_error() {
        assert_matches!(decode("Traceback (most recent call last):"), Err(EnvelopeError::Malformed(_)));
        assert_matches!(decode(r#"{"value": 1}"#), Err(EnvelopeError::MissingSuccess));
    }

    #[test]
    fn composite_values_render_with_stable_indentation() {
        let value = json!({"natom": 3, "charge": 0});
        let rendered = render_value(&value);
        let reparsed: Value = serde_json::from_str(&rendered).expect("round trip");
        assert_eq!(reparsed, value);
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn strings_render_bare() {
        assert_eq!(render_value(&json!("hello")), "hello");
        assert_eq!(render_value(&json!(42)), "42");
    }
}
