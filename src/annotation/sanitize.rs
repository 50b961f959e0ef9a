//! Removal of markdown code-fence wrapping from model replies.

use std::sync::LazyLock;

use regex::Regex;

/// Opening fence at the very start of the text, optionally tagged `json`.
/// Blank lines before it and whitespace after it are consumed.
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\s*```(?:json)?\s*").unwrap());

/// Closing fence at the very end of the text, with surrounding whitespace.
static TRAILING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```\s*\z").unwrap());

/// Strips boundary code fences and trims the result.
///
/// Only a fence at the start and a fence at the end are removed; triple
/// backticks anywhere else in the body are left alone.
///
/// ```
/// use llm_annotator::annotation::sanitize_response;
///
/// let raw = "```json\n{\"tags\": [\"US Stock\"]}\n```";
/// assert_eq!(sanitize_response(raw), "{\"tags\": [\"US Stock\"]}");
/// ```
pub fn sanitize_response(raw: &str) -> String {
    let without_leading = LEADING_FENCE.replace(raw, "");
    let without_trailing = TRAILING_FENCE.replace(&without_leading, "");
    without_trailing.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_is_unchanged() {
        assert_eq!(sanitize_response(r#"{"tags": []}"#), r#"{"tags": []}"#);
    }

    #[test]
    fn strips_json_tagged_fence() {
        let raw = "```json\n{\"tags\": [\"a\"]}\n```";
        assert_eq!(sanitize_response(raw), r#"{"tags": ["a"]}"#);
    }

    #[test]
    fn json_tag_is_matched_case_sensitively() {
        let raw = "```JSON\n{\"tags\": []}\n```";
        assert_eq!(sanitize_response(raw), "JSON\n{\"tags\": []}");
    }

    #[test]
    fn strips_untagged_fence() {
        let raw = "```\n{\"tags\": [\"a\"]}\n```";
        assert_eq!(sanitize_response(raw), r#"{"tags": ["a"]}"#);
    }

    #[test]
    fn tolerates_blank_lines_around_fences() {
        let raw = "\n\n```json\n{\"tags\": []}\n```\n\n  ";
        assert_eq!(sanitize_response(raw), r#"{"tags": []}"#);
    }

    #[test]
    fn fence_on_same_line_as_body_is_stripped() {
        let raw = "```json {\"tags\": []} ```";
        assert_eq!(sanitize_response(raw), r#"{"tags": []}"#);
    }

    #[test]
    fn interior_backticks_are_left_alone() {
        let raw = "```json\n{\"tags\": [\"```\"]}\n```";
        assert_eq!(sanitize_response(raw), "{\"tags\": [\"```\"]}");
    }

    #[test]
    fn only_whitespace_is_trimmed_without_fences() {
        assert_eq!(sanitize_response("  \n{\"a\":1}\n "), "{\"a\":1}");
    }

    #[test]
    fn wrapped_json_round_trips_to_same_value() {
        let samples = [
            r#"{"tags": ["US Stock", "Crypto"]}"#,
            r#"{"tags": []}"#,
            r#"{"tags": ["a"], "extra": {"nested": [1, 2, 3]}}"#,
            "{\n  \"tags\": [\n    \"multi\",\n    \"line\"\n  ]\n}",
        ];

        for json in samples {
            let wrapped = format!("```json\n{}\n```", json);
            let original: serde_json::Value = serde_json::from_str(json).unwrap();
            let recovered: serde_json::Value =
                serde_json::from_str(&sanitize_response(&wrapped)).unwrap();
            assert_eq!(original, recovered, "round trip failed for {json}");
        }
    }
}
