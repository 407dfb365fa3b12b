use serde_json::{json, Value};

use super::types::AnalyzeOptions;

pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse analysis response";

const DEFAULT_FOCUS: [&str; 3] = ["complexity", "patterns", "security"];

pub const ANALYSIS_TEMPERATURE: f64 = 0.3;

pub fn focus_areas(options: &AnalyzeOptions) -> String {
    match &options.types {
        Some(types) if !types.is_empty() => types.join(", "),
        _ => DEFAULT_FOCUS.join(", "),
    }
}

/// Parse a vendor's analysis reply. Models often wrap JSON in a Markdown
/// fence, so a fenced body is tried too. Anything else degrades to a
/// diagnostic payload carrying the raw text.
pub fn parse_analysis(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return value;
    }
    if let Some(inner) = strip_fence(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(inner) {
            return value;
        }
    }
    json!({
        "error": PARSE_FAILURE_MESSAGE,
        "rawResponse": raw,
    })
}

fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let rest = rest.strip_suffix("```")?;
    // drop the info string, e.g. "json"
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    Some(body.trim())
}
