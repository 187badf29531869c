//! Structured JSON extraction from normalized model text
//!
//! Finds the first brace-delimited object span, then runs an ordered list
//! of parser strategies over it: strict serde_json, then json5 (unquoted
//! keys, single quotes, trailing commas), then simd-json. First success
//! wins. The span is found with a balanced, string-aware scan rather than
//! a non-greedy regex, so an object containing nested braces or brace
//! characters inside string values is captured whole.

use serde_json::Value;

/// All parser strategies failed (or no object span was found)
#[derive(Debug, Clone)]
pub struct ExtractFailure {
    pub raw_text: String,
    pub causes: Vec<String>,
}

impl ExtractFailure {
    /// Concatenated cause chain for diagnostics
    pub fn cause_chain(&self) -> String {
        self.causes.join("; ")
    }
}

impl std::fmt::Display for ExtractFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No JSON object found in model response")?;
        if !self.causes.is_empty() {
            write!(f, " ({})", self.cause_chain())?;
        }
        Ok(())
    }
}

type ParserFn = fn(&str) -> std::result::Result<Value, String>;

/// Parser cascade, most strict first
const PARSERS: &[(&str, ParserFn)] = &[
    ("serde_json", parse_strict),
    ("json5", parse_lenient),
    ("simd-json", parse_simd),
];

/// Extract the first JSON object from text
///
/// Multiple object spans: the first one wins, even if a later span is more
/// complete. Well-behaved responses put the object near the top.
pub fn extract_json_object(text: &str) -> std::result::Result<Value, ExtractFailure> {
    let Some(span) = first_object_span(text) else {
        return Err(ExtractFailure {
            raw_text: text.to_string(),
            causes: vec!["no opening brace in response".to_string()],
        });
    };

    let mut causes = Vec::with_capacity(PARSERS.len());
    for (name, parse) in PARSERS {
        match parse(span) {
            Ok(Value::Object(map)) => return Ok(Value::Object(map)),
            Ok(other) => causes.push(format!("{}: parsed non-object value {}", name, other)),
            Err(e) => causes.push(format!("{}: {}", name, e)),
        }
    }

    Err(ExtractFailure {
        raw_text: text.to_string(),
        causes,
    })
}

fn parse_strict(s: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(s).map_err(|e| e.to_string())
}

fn parse_lenient(s: &str) -> std::result::Result<Value, String> {
    json5::from_str(s).map_err(|e| e.to_string())
}

fn parse_simd(s: &str) -> std::result::Result<Value, String> {
    let mut bytes = s.as_bytes().to_vec();
    simd_json::serde::from_slice(&mut bytes).map_err(|e| e.to_string())
}

/// Balanced-brace span starting at the first `{`
///
/// Tracks string literals and escapes so braces inside strings don't count.
/// If the braces never balance, the span runs to end of input: the lenient
/// parsers still get a chance at a truncated response.
fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    Some(&text[start..])
}
