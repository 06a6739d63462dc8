//! Post-LLM output cleanup before JSON parsing.
//!
//! Providers wrap JSON in markdown fences, prepend chatter, or emit
//! `<think>` blocks. Strip all of that and parse the first JSON object.

use std::sync::LazyLock;

use regex::Regex;

use super::error::EnrichmentError;

static THINK_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex"));

/// Strip reasoning blocks and markdown fences from raw output.
pub fn sanitize_ai_output(raw: &str) -> String {
    let text = THINK_BLOCK_RE.replace_all(raw, "");

    if let Some(inner) = CODE_FENCE_RE.captures(&text).and_then(|c| c.get(1)) {
        return inner.as_str().trim().to_string();
    }

    text.trim().to_string()
}

/// Parse a JSON object out of raw provider output and check it carries
/// `expected_key`.
pub fn parse_ai_json(raw: &str, expected_key: &str) -> Result<serde_json::Value, EnrichmentError> {
    let cleaned = sanitize_ai_output(raw);

    // Tolerate leading/trailing prose around a bare object.
    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    let candidate = match (start, end) {
        (Some(s), Some(e)) if e > s => &cleaned[s..=e],
        _ => {
            return Err(EnrichmentError::MalformedResponse(
                "No JSON object found".into(),
            ))
        }
    };

    let value: serde_json::Value = serde_json::from_str(candidate)
        .map_err(|e| EnrichmentError::MalformedResponse(e.to_string()))?;

    if value.get(expected_key).map_or(true, |v| v.is_null()) {
        return Err(EnrichmentError::MalformedResponse(format!(
            "Missing \"{expected_key}\" in response"
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "Here you go:\n```json\n{\"narrative\": \"ok\"}\n```\nThanks";
        assert_eq!(sanitize_ai_output(raw), "{\"narrative\": \"ok\"}");
    }

    #[test]
    fn strips_think_block() {
        let raw = "<think>\nlet me reason\n</think>\n{\"captions\": []}";
        assert_eq!(sanitize_ai_output(raw), "{\"captions\": []}");
    }

    #[test]
    fn parses_object_with_surrounding_prose() {
        let value = parse_ai_json("Sure! {\"narrative\": \"Hail.\"} Hope that helps.", "narrative")
            .unwrap();
        assert_eq!(value["narrative"], "Hail.");
    }

    #[test]
    fn missing_expected_key_is_malformed() {
        let err = parse_ai_json("{\"other\": 1}", "narrative").unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedResponse(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_ai_json("I cannot help with that.", "narrative").unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedResponse(_)));
    }

    #[test]
    fn broken_json_is_malformed() {
        let err = parse_ai_json("{\"narrative\": }", "narrative").unwrap_err();
        assert!(matches!(err, EnrichmentError::MalformedResponse(_)));
    }
}
