//! HTML markup stripping and allow-list filtering.
//!
//! A small tag scanner shared by the text rules (which drop all markup)
//! and the html rule (which keeps an allow-listed subset). Script and
//! style elements lose their enclosed text along with the tags.

use super::rules::url_str;

/// Tags whose enclosed text is dropped together with the tags themselves.
const CONTAINER_TAGS: &[&str] = &["script", "style"];

/// Tags the html rule preserves, with the attributes each may keep.
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "title"]),
    ("abbr", &["title"]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("cite", &[]),
    ("code", &[]),
    ("em", &[]),
    ("i", &[]),
    ("li", &[]),
    ("ol", &[]),
    ("p", &[]),
    ("pre", &[]),
    ("strong", &[]),
    ("ul", &[]),
];

/// Attributes whose values must carry an allow-listed URL scheme.
const URL_ATTRIBUTES: &[&str] = &["href", "cite"];

enum Chunk<'a> {
    Text(&'a str),
    /// Content between `<` and `>`, exclusive.
    Tag(&'a str),
}

/// Split input into text runs and tag bodies.
///
/// Script/style elements are consumed whole (tags and content) and emit
/// nothing. A `<` with no matching `>` is not a tag; it stays literal text
/// along with the rest of the input.
fn scan(input: &str) -> Vec<Chunk<'_>> {
    let lower = input.to_ascii_lowercase();
    let mut chunks = Vec::new();
    let mut i = 0;

    while i < input.len() {
        let Some(rel) = input[i..].find('<') else {
            chunks.push(Chunk::Text(&input[i..]));
            break;
        };
        if rel > 0 {
            chunks.push(Chunk::Text(&input[i..i + rel]));
        }
        let tag_start = i + rel;
        let Some(end_rel) = input[tag_start..].find('>') else {
            chunks.push(Chunk::Text(&input[tag_start..]));
            break;
        };
        let body = &input[tag_start + 1..tag_start + end_rel];
        let (closing, name) = tag_name(body);
        let mut next = tag_start + end_rel + 1;

        if !closing && CONTAINER_TAGS.contains(&name.as_str()) {
            let close = format!("</{}", name);
            next = match lower[next..].find(&close) {
                Some(c) => {
                    let close_at = next + c;
                    match lower[close_at..].find('>') {
                        Some(g) => close_at + g + 1,
                        None => input.len(),
                    }
                }
                None => input.len(),
            };
        } else {
            chunks.push(Chunk::Tag(body));
        }
        i = next;
    }

    chunks
}

/// Lowercased tag name and whether the tag is a closing one.
fn tag_name(body: &str) -> (bool, String) {
    let body = body.trim_start();
    let (closing, body) = match body.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, body),
    };
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (closing, name.to_ascii_lowercase())
}

/// Remove every tag; script/style content goes with the tags.
pub(crate) fn strip_all_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for chunk in scan(input) {
        if let Chunk::Text(text) = chunk {
            out.push_str(text);
        }
    }
    out
}

/// Keep allow-listed tags with allow-listed attributes; strip everything
/// else, preserving the text of stripped elements.
pub(crate) fn filter_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for chunk in scan(input) {
        match chunk {
            Chunk::Text(text) => out.push_str(text),
            Chunk::Tag(body) => {
                if let Some(rendered) = render_allowed_tag(body) {
                    out.push_str(&rendered);
                }
            }
        }
    }
    out
}

/// Rebuild an allow-listed tag from its scanned body, keeping only the
/// attributes on the tag's allow-list. Returns `None` for disallowed tags.
fn render_allowed_tag(body: &str) -> Option<String> {
    let (closing, name) = tag_name(body);
    let (_, allowed_attrs) = ALLOWED_TAGS.iter().find(|(tag, _)| *tag == name)?;

    if closing {
        return Some(format!("</{}>", name));
    }

    let mut rendered = format!("<{}", name);
    for (attr, value) in parse_attributes(body) {
        let attr = attr.to_ascii_lowercase();
        if !allowed_attrs.contains(&attr.as_str()) {
            continue;
        }
        let Some(value) = value else { continue };
        if URL_ATTRIBUTES.contains(&attr.as_str()) && url_str(&value).is_empty() {
            continue;
        }
        rendered.push_str(&format!(" {}=\"{}\"", attr, escape_attribute(&value)));
    }
    if body.trim_end().ends_with('/') {
        rendered.push_str(" />");
    } else {
        rendered.push('>');
    }
    Some(rendered)
}

/// Parse `name`, `name=value`, `name="value"`, and `name='value'` pairs
/// from a tag body, skipping the tag name itself.
fn parse_attributes(body: &str) -> Vec<(String, Option<String>)> {
    let chars: Vec<char> = body.chars().collect();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '/' {
        i += 1;
    }
    while i < chars.len() && chars[i].is_ascii_alphanumeric() {
        i += 1;
    }

    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' && chars[i] != '/' {
            i += 1;
        }
        if i == start {
            i += 1;
            continue;
        }
        let name: String = chars[start..i].iter().collect();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            let value = if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let quote = chars[i];
                i += 1;
                let vstart = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                let v: String = chars[vstart..i].iter().collect();
                if i < chars.len() {
                    i += 1;
                }
                v
            } else {
                // Unquoted values run to the next whitespace; they may
                // legitimately contain '/' (URLs).
                let vstart = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[vstart..i].iter().collect()
            };
            attrs.push((name, Some(value)));
        } else {
            attrs.push((name, None));
        }
    }

    attrs
}

/// Escape a string for placement inside a double-quoted HTML attribute.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_removes_tags_keeps_text() {
        assert_eq!(strip_all_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_strip_drops_script_content() {
        assert_eq!(strip_all_tags("<script>alert(1)</script>Hello"), "Hello");
        assert_eq!(
            strip_all_tags("a<style>body { color: red }</style>b"),
            "ab"
        );
    }

    #[test]
    fn test_strip_script_case_insensitive() {
        assert_eq!(strip_all_tags("<SCRIPT>evil()</SCRIPT>ok"), "ok");
    }

    #[test]
    fn test_strip_unclosed_script_swallows_rest() {
        assert_eq!(strip_all_tags("safe<script>evil()"), "safe");
    }

    #[test]
    fn test_unmatched_bracket_stays_literal() {
        assert_eq!(strip_all_tags("keep <a href="), "keep <a href=");
        assert_eq!(strip_all_tags("5 < 10 and rising"), "5 < 10 and rising");
        assert_eq!(filter_tags("5 < 10 and rising"), "5 < 10 and rising");
    }

    #[test]
    fn test_strip_plain_text_untouched() {
        assert_eq!(strip_all_tags("just text"), "just text");
    }

    #[test]
    fn test_filter_keeps_allowed_tags() {
        assert_eq!(
            filter_tags("<p>Hi <strong>there</strong></p>"),
            "<p>Hi <strong>there</strong></p>"
        );
    }

    #[test]
    fn test_filter_strips_disallowed_tags_keeps_text() {
        assert_eq!(filter_tags("<div>content</div>"), "content");
        assert_eq!(filter_tags("<iframe>x</iframe>"), "x");
    }

    #[test]
    fn test_filter_drops_script_entirely() {
        assert_eq!(filter_tags("<p>a</p><script>alert(1)</script>"), "<p>a</p>");
    }

    #[test]
    fn test_filter_keeps_allowed_attributes_only() {
        assert_eq!(
            filter_tags(r#"<a href="https://example.com" onclick="evil()">x</a>"#),
            r#"<a href="https://example.com">x</a>"#
        );
    }

    #[test]
    fn test_filter_rejects_bad_href_scheme() {
        assert_eq!(
            filter_tags(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_filter_normalizes_attribute_quoting() {
        assert_eq!(
            filter_tags("<a href='https://example.com'>x</a>"),
            r#"<a href="https://example.com">x</a>"#
        );
        assert_eq!(
            filter_tags("<a href=https://example.com>x</a>"),
            r#"<a href="https://example.com">x</a>"#
        );
    }

    #[test]
    fn test_filter_self_closing() {
        assert_eq!(filter_tags("line<br/>break"), "line<br />break");
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"a<b>&"c'"#),
            "a&lt;b&gt;&amp;&quot;c&#39;"
        );
    }
}
