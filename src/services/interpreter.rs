//! Best-effort extraction of structured data from model output
//!
//! Models are asked for JSON but often wrap it in prose or markdown fences.
//! [`interpret`] walks a fixed ladder and never fails:
//!
//! 1. the whole text parses as a JSON object;
//! 2. the first balanced `{...}` span that parses as a JSON object;
//! 3. a degraded result carrying the raw text verbatim.

use serde_json::{json, Map, Value};

pub const PARSE_ERROR_MESSAGE: &str = "Could not parse structured response";

/// Outcome of interpreting a completion
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    Parsed(Map<String, Value>),
    /// Nothing structured could be extracted; the raw text is kept for audit
    Degraded { raw_response: String },
}

impl StructuredResult {
    pub fn could_not_parse(&self) -> bool {
        matches!(self, StructuredResult::Degraded { .. })
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            StructuredResult::Parsed(object) => Some(object),
            StructuredResult::Degraded { .. } => None,
        }
    }

    /// JSON view; degraded results render as an error object with `fallback: true`
    pub fn to_value(&self) -> Value {
        match self {
            StructuredResult::Parsed(object) => Value::Object(object.clone()),
            StructuredResult::Degraded { raw_response } => json!({
                "error": PARSE_ERROR_MESSAGE,
                "raw_response": raw_response,
                "fallback": true,
            }),
        }
    }
}

pub fn interpret(raw: &str) -> StructuredResult {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) {
        return StructuredResult::Parsed(object);
    }

    if let Some(object) = first_embedded_object(raw) {
        return StructuredResult::Parsed(object);
    }

    tracing::debug!(chars = raw.len(), "Model output had no parseable JSON object");
    StructuredResult::Degraded {
        raw_response: raw.to_string(),
    }
}

/// Tries each `{` as the start of a balanced span, left to right
fn first_embedded_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .filter_map(|(start, _)| balanced_span(text, start))
        .find_map(|span| match serde_json::from_str::<Value>(span) {
            Ok(Value::Object(object)) => Some(object),
            _ => None,
        })
}

/// Returns the span from `start` (a `{`) to its matching `}`
///
/// Braces inside JSON string literals are ignored.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
