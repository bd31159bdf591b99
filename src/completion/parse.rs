//! Lenient fence stripping followed by strict schema validation.

use crate::schema::Schema;
use serde_json::Value;

/// Remove a leading ```` ```json ```` (or bare ```` ``` ````) fence and a
/// trailing ```` ``` ```` fence, then trim.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text.trim()
}

/// Parse `raw` as JSON and validate it against `schema`.
///
/// The error is a diagnostic meant to be shown back to the model.
pub fn parse_structured(raw: &str, schema: &Schema) -> Result<Value, String> {
    let clean = strip_fences(raw);
    let value: Value =
        serde_json::from_str(clean).map_err(|e| format!("Invalid JSON: {}", e))?;

    match schema.validate(&value).describe() {
        None => Ok(value),
        Some(issues) => Err(format!("Schema validation failed:\n{}", issues)),
    }
}
