//! Field-value dispatch and batch submission sanitization.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use super::field_kind::FieldKind;
use super::rules;
use super::value::SanitizedValue;

/// Sanitize one raw value according to its declared field kind.
///
/// Deterministic and side-effect free; never fails. Wrong-shaped input
/// degrades to the kind's zero value.
pub fn field_value(raw: &Value, kind: FieldKind) -> SanitizedValue {
    match kind {
        FieldKind::Text
        | FieldKind::Select
        | FieldKind::Radio
        | FieldKind::Hidden
        | FieldKind::Default => SanitizedValue::Text(rules::text(raw)),
        FieldKind::Textarea => SanitizedValue::Text(rules::textarea(raw)),
        FieldKind::Email => SanitizedValue::Text(rules::email(raw)),
        FieldKind::Url => SanitizedValue::Text(rules::url(raw)),
        FieldKind::Number => SanitizedValue::Integer(rules::number(raw)),
        FieldKind::Float => SanitizedValue::Float(rules::float(raw)),
        FieldKind::Checkbox => SanitizedValue::Flag(rules::checkbox(raw)),
        FieldKind::Html => SanitizedValue::Text(rules::html(raw)),
        FieldKind::Key => SanitizedValue::Text(rules::key(raw)),
        FieldKind::Filename => SanitizedValue::Text(rules::filename(raw)),
        FieldKind::Phone => SanitizedValue::Text(rules::phone(raw)),
        FieldKind::Json => match rules::json(raw) {
            Some(decoded) => SanitizedValue::Json(decoded),
            None => SanitizedValue::InvalidJson,
        },
    }
}

/// Sanitize every field of a submission payload.
///
/// The effective kind for each key is `field_types[key]`, falling back to
/// the text rule for undeclared fields. Every output key itself passes the
/// key rule, so two structurally different input keys may collide after
/// normalization; the collision resolves last-write-wins in the input
/// map's iteration order rather than being special-cased.
///
/// A non-object payload produces an empty map.
pub fn sanitize_submission(
    data: &Value,
    field_types: &HashMap<String, FieldKind>,
) -> BTreeMap<String, SanitizedValue> {
    let Some(object) = data.as_object() else {
        return BTreeMap::new();
    };
    let mut out = BTreeMap::new();
    for (name, raw) in object {
        let kind = field_types
            .get(name)
            .copied()
            .unwrap_or(FieldKind::Default);
        out.insert(rules::key_str(name), field_value(raw, kind));
    }
    out
}
