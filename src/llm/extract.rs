// JSON extraction from model responses that wrap output in markdown fences

/// Extract the JSON payload from raw model content.
///
/// Models asked for JSON-only output still frequently wrap it in a
/// ```json fenced block, a bare fenced block, or surrounding prose. This
/// returns the best candidate substring; the caller decides whether it
/// actually parses.
pub fn extract_json_block(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let rest = strip_fence_language(&trimmed[start + 3..]);
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }

    trimmed
}

/// Drop a language tag on the opening fence line ("```javascript\n…")
fn strip_fence_language(s: &str) -> &str {
    if let Some(newline) = s.find('\n') {
        let first_line = s[..newline].trim();
        if !first_line.is_empty() && !first_line.contains('{') && !first_line.contains('[') {
            return &s[newline + 1..];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_passes_through() {
        let content = r#"  {"score": 7}  "#;
        assert_eq!(extract_json_block(content), r#"{"score": 7}"#);
    }

    #[test]
    fn test_json_fence() {
        let content = "```json\n{\"score\": 7}\n```";
        assert_eq!(extract_json_block(content), "{\"score\": 7}");
    }

    #[test]
    fn test_generic_fence() {
        let content = "```\n{\"score\": 7}\n```";
        assert_eq!(extract_json_block(content), "{\"score\": 7}");
    }

    #[test]
    fn test_fence_with_language_tag() {
        let content = "```javascript\n{\"score\": 7}\n```";
        assert_eq!(extract_json_block(content), "{\"score\": 7}");
    }

    #[test]
    fn test_fence_surrounded_by_prose() {
        let content = "Here is the analysis:\n```json\n{\"score\": 7}\n```\nLet me know!";
        assert_eq!(extract_json_block(content), "{\"score\": 7}");
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_trimmed() {
        let content = "```json\n{\"score\": 7}";
        assert_eq!(extract_json_block(content), "```json\n{\"score\": 7}");
    }

    #[test]
    fn test_array_payload_in_fence() {
        let content = "```\n[1, 2, 3]\n```";
        assert_eq!(extract_json_block(content), "[1, 2, 3]");
    }
}
