//! Tolerant parsing of provider output.
//!
//! Models often wrap JSON in prose or code fences. Structured tasks pull the
//! first balanced `{...}` out of the raw text before handing it to serde.

use super::provider::AiError;
use serde::de::DeserializeOwned;

/// Return the first balanced `{...}` substring, honoring JSON string
/// literals and escapes so braces inside strings don't break the scan.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Deserialize the first JSON object embedded in `raw`. Any failure is a
/// recoverable `AiError::Parse`, which the orchestrator treats exactly like
/// a provider failure.
pub fn parse_embedded_json<T: DeserializeOwned>(raw: &str) -> Result<T, AiError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| AiError::Parse(format!("no JSON object in response: {:?}", raw)))?;
    serde_json::from_str(json).map_err(|e| AiError::Parse(e.to_string()))
}
