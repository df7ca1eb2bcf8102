//! Indentation-safe embedding of partial output.
//!
//! A partial's expansion is spliced verbatim into its parent's text, usually
//! somewhere in the middle of an indented YAML block. Multi-line YAML would
//! only survive that if the partial knew the indentation of its call site, so
//! embedded fragments are parsed and re-serialized as compact single-line
//! JSON. JSON is valid YAML flow syntax and means the same thing at any
//! indentation.
//!
//! Output that contains a bare `---` line is treated as a complete top-level
//! document stream and returned unchanged. The check is purely textual: a
//! partial meant for embedding that happens to contain such a line is
//! returned as-is and will usually break the parent document.

use serde_json::{Map, Number, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use super::error::TemplateError;

const DOCUMENT_START: &str = "---";

/// How an expanded fragment is spliced into its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Complete document(s), returned unchanged.
    TopLevelDocument,
    /// A value embedded in a larger document, normalized to JSON.
    Embedded,
}

/// Classify expanded text as a top-level document or an embedded fragment.
pub fn classify(fragment: &str) -> FragmentKind {
    let is_document_start =
        |line: &str| line.strip_prefix(DOCUMENT_START).is_some_and(|rest| rest.trim().is_empty());

    if fragment.lines().any(is_document_start) {
        FragmentKind::TopLevelDocument
    } else {
        FragmentKind::Embedded
    }
}

/// Normalize the expansion of `partial` for splicing into its parent.
///
/// # Errors
///
/// Returns [`TemplateError::Normalization`] with the offending text if an
/// embedded fragment is not valid YAML or cannot be represented as JSON
/// without changing its meaning.
pub fn normalize(partial: &str, fragment: &str) -> Result<String, TemplateError> {
    if classify(fragment) == FragmentKind::TopLevelDocument {
        tracing::debug!("Partial '{}' renders a top-level document, embedding as-is", partial);
        return Ok(fragment.to_string());
    }

    let fail = |reason: String| TemplateError::Normalization {
        partial: partial.to_string(),
        reason,
        fragment: fragment.to_string(),
    };

    if fragment.trim().is_empty() {
        return Ok("null".to_string());
    }

    let mut parsed: YamlValue =
        serde_yaml::from_str(fragment).map_err(|e| fail(e.to_string()))?;
    parsed.apply_merge().map_err(|e| fail(e.to_string()))?;
    let json = yaml_to_json(&parsed).map_err(fail)?;
    let serialized = serde_json::to_string(&json).map_err(|e| fail(e.to_string()))?;
    let inline = escape_unprintable(&serialized);

    tracing::debug!("Normalized partial '{}' to {} byte(s) of inline JSON", partial, inline.len());
    Ok(inline)
}

/// Escape characters that JSON allows raw but YAML does not.
///
/// serde_json only escapes C0 controls. DEL and C1 controls are not printable
/// in YAML, and NEL, LS and PS count as line breaks inside a flow scalar.
/// They can only occur inside JSON strings, where `\uXXXX` means the same in
/// both languages.
fn escape_unprintable(json: &str) -> String {
    if !json.chars().any(needs_escape) {
        return json.to_string();
    }

    let mut escaped = String::with_capacity(json.len() + 8);
    for c in json.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("\\u{:04x}", u32::from(c)));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{7f}'..='\u{9f}' | '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
    )
}

/// Parse a multi-document YAML stream.
///
/// # Errors
///
/// Returns the first parse error encountered.
pub fn parse_document_stream(text: &str) -> Result<Vec<YamlValue>, serde_yaml::Error> {
    use serde::Deserialize;

    serde_yaml::Deserializer::from_str(text).map(YamlValue::deserialize).collect()
}

/// Convert a YAML value to JSON without changing its meaning.
///
/// Mapping keys must be strings and floats must be finite; anything else has
/// no faithful JSON form and is rejected rather than silently coerced.
fn yaml_to_json(value: &YamlValue) -> Result<JsonValue, String> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(*b),
        YamlValue::Number(n) => yaml_number_to_json(n)?,
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(items) => {
            JsonValue::Array(items.iter().map(yaml_to_json).collect::<Result<_, _>>()?)
        }
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                let YamlValue::String(key) = key else {
                    return Err(format!(
                        "mapping key {} is not a string; quote it to embed this partial",
                        describe_key(key)
                    ));
                };
                object.insert(key.clone(), yaml_to_json(value)?);
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => {
            return Err(format!("tagged value {} cannot be embedded as JSON", tagged.tag));
        }
    })
}

fn yaml_number_to_json(n: &serde_yaml::Number) -> Result<JsonValue, String> {
    if let Some(i) = n.as_i64() {
        return Ok(JsonValue::Number(i.into()));
    }
    if let Some(u) = n.as_u64() {
        return Ok(JsonValue::Number(u.into()));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(JsonValue::Number)
        .ok_or_else(|| format!("number {n} has no JSON representation"))
}

fn describe_key(key: &YamlValue) -> String {
    serde_yaml::to_string(key)
        .map(|s| format!("`{}`", s.trim_end()))
        .unwrap_or_else(|_| "(complex key)".to_string())
}
