//! Field kind tags.
//!
//! The closed set of field semantics a form definition can declare. The
//! kind is supplied by the caller per submission, never inferred from the
//! value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared semantics of a form field, selecting its sanitization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Textarea,
    Email,
    Url,
    Number,
    Float,
    Checkbox,
    Select,
    Radio,
    Hidden,
    Json,
    Phone,
    Key,
    Filename,
    Html,
    /// Fallback for unrecognized tags; sanitized with the text rule.
    Default,
}

impl FieldKind {
    /// Map a caller-supplied tag string to a kind.
    ///
    /// Unrecognized tags map to [`FieldKind::Default`] rather than failing,
    /// so a form definition with a typo'd type still sanitizes (with the
    /// strictest string rule) instead of passing raw input through.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "textarea" => Self::Textarea,
            "email" => Self::Email,
            "url" => Self::Url,
            "number" => Self::Number,
            "float" => Self::Float,
            "checkbox" => Self::Checkbox,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "hidden" => Self::Hidden,
            "json" => Self::Json,
            "phone" => Self::Phone,
            "key" | "slug" => Self::Key,
            "filename" => Self::Filename,
            "html" => Self::Html,
            _ => Self::Default,
        }
    }

    /// The canonical tag string for this kind.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number => "number",
            Self::Float => "float",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Hidden => "hidden",
            Self::Json => "json",
            Self::Phone => "phone",
            Self::Key => "key",
            Self::Filename => "filename",
            Self::Html => "html",
            Self::Default => "default",
        }
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(FieldKind::from_tag("text"), FieldKind::Text);
        assert_eq!(FieldKind::from_tag("email"), FieldKind::Email);
        assert_eq!(FieldKind::from_tag("checkbox"), FieldKind::Checkbox);
        assert_eq!(FieldKind::from_tag("json"), FieldKind::Json);
    }

    #[test]
    fn test_tag_normalization() {
        assert_eq!(FieldKind::from_tag("  Email "), FieldKind::Email);
        assert_eq!(FieldKind::from_tag("NUMBER"), FieldKind::Number);
    }

    #[test]
    fn test_slug_alias() {
        assert_eq!(FieldKind::from_tag("slug"), FieldKind::Key);
        assert_eq!(FieldKind::from_tag("key"), FieldKind::Key);
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        assert_eq!(FieldKind::from_tag("datepicker"), FieldKind::Default);
        assert_eq!(FieldKind::from_tag(""), FieldKind::Default);
    }

    #[test]
    fn test_deserialize_with_fallback() {
        let kinds: Vec<FieldKind> =
            serde_json::from_str(r#"["email", "number", "no-such-type"]"#).unwrap();
        assert_eq!(
            kinds,
            vec![FieldKind::Email, FieldKind::Number, FieldKind::Default]
        );
    }

    #[test]
    fn test_serialize_roundtrip() {
        let json = serde_json::to_string(&FieldKind::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let back: FieldKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldKind::Textarea);
    }
}
