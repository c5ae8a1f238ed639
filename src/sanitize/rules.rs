//! Per-kind sanitization rules.
//!
//! Each rule maps a raw `serde_json::Value` to its kind's output type.
//! String rules coerce non-string input to the empty string; the numeric
//! and checkbox rules accept any shape. No rule fails.

use serde_json::Value;

use super::markup::{filter_tags, strip_all_tags};

/// Maximum length for an email address.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for the local part of an email address.
const MAX_LOCAL_LENGTH: usize = 64;

/// Maximum length for a domain name.
const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum length for a domain label (part between dots).
const MAX_LABEL_LENGTH: usize = 63;

/// Non-alphanumeric characters permitted in an email local part.
const LOCAL_ALLOWED: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Schemes a sanitized URL may carry.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "tel"];

/// String members of the checkbox truthy set.
const TRUTHY: &[&str] = &["1", "true", "yes", "on"];

/// Strip markup, collapse whitespace runs, trim ends.
pub(crate) fn text(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    collapse_whitespace(&strip_all_tags(s))
}

/// Strip markup but preserve internal whitespace and newlines.
pub(crate) fn textarea(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    strip_all_tags(&s.replace("\r\n", "\n")).trim().to_string()
}

/// Validate an address shape; lowercase the domain; invalid input yields
/// the empty string.
pub(crate) fn email(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    let s = s.trim();
    if s.is_empty() || s.len() > MAX_EMAIL_LENGTH {
        return String::new();
    }
    let Some((local, domain)) = s.rsplit_once('@') else {
        return String::new();
    };
    if local.is_empty() || local.len() > MAX_LOCAL_LENGTH || local.contains('@') {
        return String::new();
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return String::new();
    }
    for c in local.chars() {
        if !c.is_ascii_alphanumeric() && !LOCAL_ALLOWED.contains(c) {
            return String::new();
        }
    }
    if !valid_domain(domain) {
        return String::new();
    }
    format!("{}@{}", local, domain.to_ascii_lowercase())
}

fn valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > MAX_DOMAIN_LENGTH {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    // Must have at least 2 labels (domain + TLD)
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| valid_domain_label(label))
}

fn valid_domain_label(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
        return false;
    }
    let chars: Vec<char> = label.chars().collect();
    if !chars[0].is_ascii_alphanumeric() || !chars[chars.len() - 1].is_ascii_alphanumeric() {
        return false;
    }
    chars.iter().all(|c| c.is_ascii_alphanumeric() || *c == '-')
}

/// Strip disallowed characters and reject disallowed schemes.
pub(crate) fn url(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    url_str(s)
}

/// String form of the url rule, shared with the html attribute filter.
pub(crate) fn url_str(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| {
            !c.is_control()
                && !c.is_whitespace()
                && !matches!(c, '<' | '>' | '"' | '`' | '{' | '}' | '|' | '\\' | '^')
        })
        .collect();
    if cleaned.is_empty() {
        return String::new();
    }
    if let Some(colon) = cleaned.find(':') {
        let scheme = &cleaned[..colon];
        let scheme_shaped = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if scheme_shaped && !ALLOWED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
            return String::new();
        }
    }
    cleaned
}

/// Coerce to a non-negative integer; the sign is discarded.
pub(crate) fn number(raw: &Value) -> u64 {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.unsigned_abs()
            } else if let Some(u) = n.as_u64() {
                u
            } else if let Some(f) = n.as_f64() {
                f.abs().trunc() as u64
            } else {
                0
            }
        }
        Value::String(s) => leading_int(s).unsigned_abs(),
        Value::Bool(b) => *b as u64,
        _ => 0,
    }
}

/// Parse an optional-sign integer prefix; "25.7" parses as 25.
fn leading_int(s: &str) -> i64 {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let run: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if run.is_empty() {
        return 0;
    }
    let value = run.parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -value
    } else {
        value
    }
}

/// Extract the numeric characters (digits, sign, decimal point) and parse;
/// unlike the number rule, the sign survives.
pub(crate) fn float(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let filtered: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
                .collect();
            filtered.parse::<f64>().unwrap_or(0.0)
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Coerce to a boolean. Strings match the truthy set case-insensitively
/// after trimming; numbers are truthy only at exactly 1; anything outside
/// the truthy set is false.
pub(crate) fn checkbox(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => TRUTHY.contains(&s.trim().to_ascii_lowercase().as_str()),
        _ => false,
    }
}

/// Keep an allow-listed tag subset; strip everything else.
pub(crate) fn html(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    filter_tags(s)
}

/// Lowercase and keep only `[a-z0-9_-]`.
pub(crate) fn key(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    key_str(s)
}

/// String form of the key rule, shared with submission key normalization.
pub(crate) fn key_str(s: &str) -> String {
    s.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-'))
        .collect()
}

/// Keep only `[A-Za-z0-9_.-]`; dot runs collapse so traversal sequences
/// cannot survive, and separator characters are trimmed from the ends.
pub(crate) fn filename(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    let filtered: String = s
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let mut out = String::with_capacity(filtered.len());
    let mut prev_dot = false;
    for c in filtered.chars() {
        if c == '.' {
            if prev_dot {
                continue;
            }
            prev_dot = true;
        } else {
            prev_dot = false;
        }
        out.push(c);
    }
    out.trim_matches(|c| matches!(c, '.' | '-' | '_')).to_string()
}

/// Keep only digits, `+`, `-`, parentheses, and spaces.
pub(crate) fn phone(raw: &Value) -> String {
    let Some(s) = raw.as_str() else {
        return String::new();
    };
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '))
        .collect();
    kept.trim().to_string()
}

/// Attempt a structured decode. `None` is the failure sentinel; the
/// dispatch layer surfaces it as [`super::SanitizedValue::InvalidJson`].
pub(crate) fn json(raw: &Value) -> Option<Value> {
    let s = raw.as_str()?;
    serde_json::from_str(s).ok()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
