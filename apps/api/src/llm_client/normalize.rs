//! Response normalizer: turns raw oracle text into a structured JSON value.
//!
//! Models frequently wrap JSON in ```json fences even when told not to. Every
//! fence marker is removed wherever it appears, the remainder is trimmed and
//! parsed. Anything that is not valid JSON after that is rejected outright.

use serde_json::Value;

use crate::errors::AppError;

const FENCE: &str = "```";

/// Removes every code-fence marker (```` ``` ```` optionally tagged `json` and
/// followed by a newline) and trims surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        rest = rest.strip_prefix("json").unwrap_or(rest);
        rest = rest.strip_prefix('\n').unwrap_or(rest);
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Strips fences and parses the remainder as JSON.
///
/// Fails with `MalformedOracleResponse` when the remainder is not valid JSON.
/// No partial recovery is attempted.
pub fn normalize_json(text: &str) -> Result<Value, AppError> {
    let cleaned = strip_code_fences(text);
    serde_json::from_str(&cleaned).map_err(|e| {
        let preview: String = cleaned.chars().take(80).collect();
        AppError::MalformedOracleResponse(format!("{e} (response began: {preview:?})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "  {\"key\": \"value\"}\n";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_found_mid_text() {
        let input = "\n\n```json\n{\"a\": [1, 2]}```\n\n";
        assert_eq!(strip_code_fences(input), "{\"a\": [1, 2]}");
    }

    #[test]
    fn test_normalize_is_idempotent_with_respect_to_fencing() {
        let body = json!({
            "growthRate": 4.5,
            "demandLevel": "High",
            "topSkills": ["ROS", "C++"]
        });
        let plain = serde_json::to_string_pretty(&body).unwrap();
        let fenced = format!("```json\n{plain}\n```");

        let from_fenced = normalize_json(&fenced).unwrap();
        let from_plain = normalize_json(&plain).unwrap();
        assert_eq!(from_fenced, body);
        assert_eq!(from_plain, from_fenced);
    }

    #[test]
    fn test_normalize_rejects_prose() {
        let err = normalize_json("Sure! Here's the analysis: ...").unwrap_err();
        assert!(matches!(err, AppError::MalformedOracleResponse(_)));
    }

    #[test]
    fn test_normalize_rejects_truncated_json() {
        let err = normalize_json("```json\n{\"growthRate\": 4.5, \"topSkills\": [\"ROS\"").unwrap_err();
        assert!(matches!(err, AppError::MalformedOracleResponse(_)));
    }

    #[test]
    fn test_normalize_rejects_empty() {
        let err = normalize_json("```json\n```").unwrap_err();
        assert!(matches!(err, AppError::MalformedOracleResponse(_)));
    }
}
