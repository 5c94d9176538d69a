//! Response extraction engine.
//!
//! Extraction rules run in declared order after a call completes and write
//! variables into the workspace's extracted map. A rule that finds nothing
//! (missing header, unparseable body, dead JSON path) is skipped silently;
//! extraction never fails a call. When several rules target the same name,
//! the one declared later wins.

use crate::models::{CallResponse, ExtractRule, ExtractSource};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Applies `rules` in order against `response`, writing matches into
/// `extracted`. Returns the number of writes performed; the caller persists
/// workspace state only when this is non-zero.
pub fn apply_extract_rules(
    rules: &[ExtractRule],
    response: &CallResponse,
    extracted: &mut BTreeMap<String, String>,
) -> usize {
    // One best-effort parse shared by every JSON_BODY rule. A body that is
    // not JSON simply means those rules find nothing.
    let parsed_body: Option<JsonValue> = serde_json::from_slice(&response.body).ok();

    let mut writes = 0;
    for rule in rules {
        let value = match rule.from {
            ExtractSource::Header => response.header(&rule.value).map(str::to_string),
            ExtractSource::JsonBody => parsed_body
                .as_ref()
                .and_then(|body| evaluate_json_path(body, &rule.value))
                .map(|value| json_value_to_string(&value)),
        };
        if let Some(value) = value {
            log::debug!("extracted {} <- {:?}", rule.to, value);
            extracted.insert(rule.to.clone(), value);
            writes += 1;
        } else {
            log::debug!("extract rule for {} matched nothing, skipping", rule.to);
        }
    }
    writes
}

/// A segment of a JSON path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    /// Object field access, e.g. `user`.
    Field(String),
    /// Array index access, e.g. `[0]`.
    Index(usize),
}

/// Evaluates a single-value JSON path (`$.user.items[0].id`) against a
/// JSON document. Returns `None` for malformed paths and for paths that do
/// not resolve; extraction treats both as a silent skip.
pub fn evaluate_json_path(json: &JsonValue, path: &str) -> Option<JsonValue> {
    let path = path.trim();
    if path == "$" {
        return Some(json.clone());
    }

    let path = path.strip_prefix('$').unwrap_or(path);
    let segments = parse_path_segments(path)?;

    let mut current = json;
    for segment in &segments {
        current = match segment {
            PathSegment::Field(name) => current.get(name)?,
            PathSegment::Index(index) => current.get(index)?,
        };
    }
    Some(current.clone())
}

/// Parses the part of a JSON path after `$` into segments. Supports dotted
/// field access and numeric indexers, including chained ones (`a[0][1]`).
fn parse_path_segments(path: &str) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                let mut field = String::new();
                while let Some(&next) = chars.peek() {
                    if next == '.' || next == '[' {
                        break;
                    }
                    field.push(next);
                    chars.next();
                }
                if field.is_empty() {
                    return None;
                }
                segments.push(PathSegment::Field(field));
            }
            '[' => {
                let mut index = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(digit) => index.push(digit),
                        None => return None,
                    }
                }
                segments.push(PathSegment::Index(index.trim().parse().ok()?));
            }
            _ => return None,
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}

/// Stringifies an extracted JSON value: strings lose their quotes, scalars
/// use their display form, null becomes `null`, and composite values are
/// serialized back to compact JSON.
pub fn json_value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}
