//! Response normalization
//!
//! Strips the formatting artifacts models wrap around their JSON: code
//! fences, ellipsis filler, comment lines, and "Note:"/"Explanation:"
//! prose. Purely textual; no JSON awareness.

/// Clean raw model output down to the lines worth parsing
pub fn normalize_response(raw: &str) -> String {
    let mut content = raw.trim();

    // Surrounding code fence, with optional language tag on the opener
    if content.starts_with("```") {
        content = match content.find('\n') {
            Some(pos) => &content[pos + 1..],
            None => content.trim_matches('`'),
        };
    }
    if let Some(stripped) = content.trim_end().strip_suffix("```") {
        content = stripped;
    }

    let cleaned: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !should_drop_line(line))
        .collect();

    cleaned.join("\n")
}

fn should_drop_line(line: &str) -> bool {
    if line.is_empty() || line == "..." || line == "\u{2026}" {
        return true;
    }
    if line.starts_with('#') || line.starts_with("```") {
        return true;
    }
    let lower = line.to_lowercase();
    lower.starts_with("note") || lower.starts_with("explanation")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_untouched() {
        let raw = r#"{"decision": "approved"}"#;
        assert_eq!(normalize_response(raw), raw);
    }

    #[test]
    fn test_strips_code_fence_with_language_tag() {
        let raw = "```json\n{\"decision\": \"approved\"}\n```";
        assert_eq!(normalize_response(raw), "{\"decision\": \"approved\"}");
    }

    #[test]
    fn test_strips_bare_code_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(normalize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_drops_ellipsis_and_empty_lines() {
        let raw = "{\n...\n\u{2026}\n\n\"a\": 1\n}";
        assert_eq!(normalize_response(raw), "{\n\"a\": 1\n}");
    }

    #[test]
    fn test_drops_comment_and_note_lines() {
        let raw = "# a comment\nNote: this is tentative\nEXPLANATION: because\n{\"a\": 1}";
        assert_eq!(normalize_response(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_trims_indented_lines() {
        let raw = "  {\n    \"a\": 1\n  }  ";
        assert_eq!(normalize_response(raw), "{\n\"a\": 1\n}");
    }
}
