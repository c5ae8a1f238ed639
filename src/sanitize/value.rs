//! Sanitized value type.

use serde::Serialize;
use serde_json::Value;

/// The typed result of sanitizing one raw value.
///
/// The variant is determined by the declared field kind, not by the input:
/// string-family kinds always produce `Text`, the number rule always
/// produces `Integer`, and so on. Sanitization is deterministic, so the
/// same (raw value, kind) pair always yields the same `SanitizedValue`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SanitizedValue {
    /// Output of the string-family rules.
    Text(String),
    /// Non-negative integer from the number rule.
    Integer(u64),
    /// Signed value from the float rule.
    Float(f64),
    /// Boolean from the checkbox rule.
    Flag(bool),
    /// Successfully decoded payload from the json rule.
    Json(Value),
    /// Decode-failure sentinel for the json rule. Serializes as `null` but
    /// stays distinguishable from a decoded `null` in the type system, so
    /// callers can branch on "invalid" vs "empty".
    InvalidJson,
}

impl SanitizedValue {
    /// The inner string, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The inner integer, if this is an `Integer` value.
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The inner float, if this is a `Float` value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The inner boolean, if this is a `Flag` value.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// The decoded payload, if this is a `Json` value.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this is the json decode-failure sentinel.
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, Self::InvalidJson)
    }

    /// Whether this value is the zero value of its kind.
    ///
    /// Rules degrade bad input to zero values instead of failing; callers
    /// that need strict validation use this to tell "absent or rejected"
    /// apart from a real value. `Flag(false)` and `Json(null)` count as
    /// empty, as does the decode-failure sentinel.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(n) => *n == 0,
            Self::Float(f) => *f == 0.0,
            Self::Flag(b) => !b,
            Self::Json(v) => v.is_null(),
            Self::InvalidJson => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_serialization() {
        assert_eq!(
            serde_json::to_string(&SanitizedValue::Text("hi".to_string())).unwrap(),
            "\"hi\""
        );
        assert_eq!(
            serde_json::to_string(&SanitizedValue::Integer(25)).unwrap(),
            "25"
        );
        assert_eq!(
            serde_json::to_string(&SanitizedValue::Flag(true)).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&SanitizedValue::Json(json!({"a": 1}))).unwrap(),
            r#"{"a":1}"#
        );
        assert_eq!(
            serde_json::to_string(&SanitizedValue::InvalidJson).unwrap(),
            "null"
        );
    }

    #[test]
    fn test_sentinel_distinct_from_decoded_null() {
        let decoded_null = SanitizedValue::Json(Value::Null);
        assert!(!decoded_null.is_invalid_json());
        assert!(SanitizedValue::InvalidJson.is_invalid_json());
        assert_ne!(decoded_null, SanitizedValue::InvalidJson);
    }

    #[test]
    fn test_is_empty() {
        assert!(SanitizedValue::Text(String::new()).is_empty());
        assert!(!SanitizedValue::Text("x".to_string()).is_empty());
        assert!(SanitizedValue::Integer(0).is_empty());
        assert!(SanitizedValue::Flag(false).is_empty());
        assert!(SanitizedValue::InvalidJson.is_empty());
        assert!(!SanitizedValue::Json(serde_json::json!({})).is_empty());
    }
}
