//! Output unwrapping: pulls the JSON payload out of a model reply.
//!
//! Replies may be bare JSON, JSON fenced in a markdown code block, or a fenced
//! block whose markers and newlines arrive backslash-escaped. Anything that
//! still does not parse as a JSON object is kept verbatim as `raw_text`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::models::record::{RecordOutcome, StructuredRecord};

/// ```` ```json ... ``` ```` with real whitespace; shortest match wins.
static FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Same fence with escaped backticks and/or literal `\n`, `\r`, `\t` sequences.
static ESCAPED_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)\\?`\\?`\\?`(?:json)?(?:\s|\\[nrt])*(.*?)(?:\s|\\[nrt])*\\?`\\?`\\?`",
    )
    .unwrap()
});

/// Returns the JSON-looking payload of a model reply, or the reply unchanged
/// when no fence is present.
pub fn unwrap_response(raw: &str) -> String {
    if let Some(inner) = FENCE.captures(raw).and_then(|c| c.get(1)) {
        return inner.as_str().to_string();
    }

    if let Some(inner) = ESCAPED_FENCE.captures(raw).and_then(|c| c.get(1)) {
        return unescape(inner.as_str());
    }

    raw.to_string()
}

/// Decodes `\n`, `\"` and friends when the text is a valid JSON string body;
/// otherwise returns it as is.
fn unescape(text: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{text}\"")).unwrap_or_else(|_| text.to_string())
}

/// Unwraps and parses a model reply. Never fails: a reply that is not a JSON
/// object becomes `RecordOutcome::Unparsed` carrying the original reply.
pub fn parse_response(raw: &str) -> RecordOutcome {
    let payload = unwrap_response(raw);

    match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Object(map)) => RecordOutcome::Parsed(StructuredRecord::from_map(map)),
        Ok(other) => {
            warn!("Model reply is JSON but not an object ({}); keeping raw text", json_kind(&other));
            unparsed(raw)
        }
        Err(e) => {
            warn!("Model reply was not JSON ({e}); keeping raw text");
            unparsed(raw)
        }
    }
}

fn unparsed(raw: &str) -> RecordOutcome {
    RecordOutcome::Unparsed {
        raw_text: raw.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::RecordStatus;

    #[test]
    fn test_fenced_json_yields_interior() {
        assert_eq!(unwrap_response("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_fence_tag_is_case_insensitive_and_optional() {
        assert_eq!(unwrap_response("```JSON\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(unwrap_response("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_first_fence_wins() {
        let raw = "Here you go:\n```json\n{\"a\":1}\n```\nand also\n```json\n{\"b\":2}\n```";
        assert_eq!(unwrap_response(raw), "{\"a\":1}");
    }

    #[test]
    fn test_unfenced_is_unchanged() {
        assert_eq!(unwrap_response("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(unwrap_response("not json at all"), "not json at all");
    }

    #[test]
    fn test_escaped_fence_is_unescaped() {
        let raw = r#"\`\`\`json\n{\"a\": 1}\n\`\`\`"#;
        let payload = unwrap_response(raw);
        assert_eq!(payload, "{\"a\": 1}");
        assert_eq!(serde_json::from_str::<Value>(&payload).unwrap()["a"], 1);
    }

    #[test]
    fn test_not_json_degrades_to_raw_text() {
        let outcome = parse_response("not json at all");
        assert_eq!(
            outcome,
            RecordOutcome::Unparsed {
                raw_text: "not json at all".to_string()
            }
        );
        assert!(outcome.is_degraded());
    }

    #[test]
    fn test_degraded_record_keeps_original_reply() {
        let raw = "```json\n{\"first_name\": \"Jane\",\n```";
        match parse_response(raw) {
            RecordOutcome::Unparsed { raw_text } => assert_eq!(raw_text, raw),
            other => panic!("expected degraded record, got {other:?}"),
        }
    }

    #[test]
    fn test_both_email_spellings_still_parse() {
        let raw = r#"{"status":"Success","first_name":"Jane","email":"jane@x.com","email_address":"jane@x.com","skills":["Rust"]}"#;
        match parse_response(raw) {
            RecordOutcome::Parsed(record) => {
                assert_eq!(record.email.as_deref(), Some("jane@x.com"));
                assert_eq!(record.extra["email_address"], "jane@x.com");
                assert_eq!(record.skills, vec!["Rust"]);
            }
            other => panic!("expected parsed record, got {other:?}"),
        }
    }

    #[test]
    fn test_json_array_degrades() {
        assert!(parse_response("[1, 2, 3]").is_degraded());
    }

    #[test]
    fn test_fenced_record_parses() {
        let raw = "```json\n{\"status\": \"Success\", \"First_Name\": \"Jane\", \"skills\": [\"Rust\"]}\n```";
        match parse_response(raw) {
            RecordOutcome::Parsed(record) => {
                assert_eq!(record.status, RecordStatus::Success);
                assert_eq!(record.first_name.as_deref(), Some("Jane"));
                assert_eq!(record.skills, vec!["Rust"]);
            }
            other => panic!("expected parsed record, got {other:?}"),
        }
    }
}
