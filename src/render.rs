//! Console rendering for requests, responses, and call timings.
//!
//! Everything here produces strings; printing is the caller's business.
//! JSON bodies are pretty-printed with 2-space indentation when the
//! response says it is JSON, and shown raw when it lies.

use crate::models::CallResponse;
use colored::Colorize;
use serde::Serialize;
use std::time::Duration;

/// Content type assumed when the response does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const DURATION_UNITS: &[(&str, u128)] = &[
    ("days", 86_400_000),
    ("hours", 3_600_000),
    ("minutes", 60_000),
    ("seconds", 1_000),
    ("ms", 1),
];

/// Banner echoed above the outgoing request.
pub fn request_banner(workspace: &str, vars: &str) -> String {
    format!("-=-= REQUEST ({}.{})", workspace, vars)
}

/// Banner separating the request echo from the response.
pub fn response_banner(workspace: &str, vars: &str) -> String {
    format!("-=-= RESPONSE ({}.{})", workspace, vars)
}

/// One `Name: value` line per header, names in bold.
pub fn format_header_lines(headers: &[(String, String)]) -> Vec<String> {
    headers
        .iter()
        .map(|(name, value)| format!("{}: {}", name.bold(), value))
        .collect()
}

/// Status code in bold yellow, with the reason phrase in parentheses when
/// one is known.
pub fn format_status_line(response: &CallResponse) -> String {
    let code = response.status.to_string().yellow().bold();
    if response.status_text.is_empty() {
        code.to_string()
    } else {
        format!("{} ({})", code, response.status_text)
    }
}

/// The response's declared content type, or the plain-text default.
pub fn response_content_type(response: &CallResponse) -> &str {
    response.content_type().unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// The media type with any parameters stripped:
/// `application/json; charset=utf-8` becomes `application/json`.
pub fn essence(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

/// The body as display text. JSON gets pretty-printed; a body that claims
/// to be JSON but does not parse falls back to the raw text.
pub fn render_body_text(response: &CallResponse) -> String {
    let text = response.body_as_string();
    let media_type = essence(response_content_type(response)).to_ascii_lowercase();
    if media_type.ends_with("/json") {
        if let Some(pretty) = pretty_print_json(&text) {
            return pretty;
        }
    }
    text
}

fn pretty_print_json(text: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut buf = Vec::with_capacity(text.len() + text.len() / 2);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).ok()?;
    String::from_utf8(buf).ok()
}

/// The timing line shown after a call when call times are enabled.
pub fn format_call_time_line(elapsed: Duration) -> String {
    format!("{} {}", "call took:".cyan(), format_duration_human(elapsed))
}

/// Renders a duration as its nonzero components, largest unit first, with
/// singular labels when the count is one. "ms" never singularizes, and a
/// zero duration comes out as "0 ms".
pub fn format_duration_human(duration: Duration) -> String {
    let mut remaining = duration.as_millis();
    let mut parts: Vec<String> = Vec::new();
    for (label, unit) in DURATION_UNITS {
        if remaining >= *unit {
            let count = remaining / unit;
            remaining -= count * unit;
            let label = if count == 1 && *label != "ms" {
                &label[..label.len() - 1]
            } else {
                label
            };
            parts.push(format!("{} {}", count, label));
        }
    }
    if parts.is_empty() {
        "0 ms".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content_type: Option<&str>, body: &[u8]) -> CallResponse {
        let mut headers = Vec::new();
        if let Some(value) = content_type {
            headers.push(("Content-Type".to_string(), value.to_string()));
        }
        CallResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers,
            body: body.to_vec(),
            elapsed: Duration::from_millis(0),
        }
    }

    #[test]
    fn test_essence_strips_parameters() {
        assert_eq!(essence("application/json; charset=utf-8"), "application/json");
        assert_eq!(essence("text/plain"), "text/plain");
        assert_eq!(essence(""), "");
    }

    #[test]
    fn test_json_body_is_pretty_printed() {
        let resp = response(Some("application/json"), br#"{"a":1,"b":[true,null]}"#);
        let rendered = render_body_text(&resp);
        assert_eq!(rendered, "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}");
    }

    #[test]
    fn test_json_detection_ignores_case_and_parameters() {
        let resp = response(Some("APPLICATION/JSON; charset=utf-8"), br#"{"a":1}"#);
        assert_eq!(render_body_text(&resp), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_vendor_json_types_are_pretty_printed() {
        let resp = response(Some("application/vnd.api/json"), br#"[1,2]"#);
        assert_eq!(render_body_text(&resp), "[\n  1,\n  2\n]");
    }

    #[test]
    fn test_malformed_json_falls_back_to_raw() {
        let resp = response(Some("application/json"), b"{not json");
        assert_eq!(render_body_text(&resp), "{not json");
    }

    #[test]
    fn test_non_json_body_is_left_alone() {
        let resp = response(Some("text/html"), b"<p>{\"a\":1}</p>");
        assert_eq!(render_body_text(&resp), "<p>{\"a\":1}</p>");
    }

    #[test]
    fn test_missing_content_type_defaults_to_plain_text() {
        let resp = response(None, b"plain");
        assert_eq!(response_content_type(&resp), "text/plain");
        assert_eq!(render_body_text(&resp), "plain");
    }

    #[test]
    fn test_status_line_includes_reason_when_known() {
        colored::control::set_override(false);
        let mut resp = response(None, b"");
        assert_eq!(format_status_line(&resp), "200 (OK)");
        resp.status = 599;
        resp.status_text = String::new();
        assert_eq!(format_status_line(&resp), "599");
    }

    #[test]
    fn test_duration_zero_is_zero_ms() {
        assert_eq!(format_duration_human(Duration::from_millis(0)), "0 ms");
    }

    #[test]
    fn test_duration_ms_never_singularizes() {
        assert_eq!(format_duration_human(Duration::from_millis(1)), "1 ms");
    }

    #[test]
    fn test_duration_combines_units_largest_first() {
        assert_eq!(
            format_duration_human(Duration::from_millis(61_005)),
            "1 minute, 1 second, 5 ms"
        );
        assert_eq!(
            format_duration_human(Duration::from_millis(90_000)),
            "1 minute, 30 seconds"
        );
        assert_eq!(
            format_duration_human(Duration::from_millis(2 * 3_600_000)),
            "2 hours"
        );
        assert_eq!(
            format_duration_human(Duration::from_millis(86_400_000 + 3_600_000)),
            "1 day, 1 hour"
        );
    }
}
