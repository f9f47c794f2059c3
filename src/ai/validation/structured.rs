//! Strict JSON object decoding with tagged fallback.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::strip_code_fence;
use crate::types::StageOutput;

/// Decode a model answer as a JSON object of type `T`.
///
/// An outer code fence is stripped first. Anything that isn't a JSON object
/// (arrays, scalars, prose, truncated output) yields `None`.
pub fn parse_object<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let cleaned = strip_code_fence(raw);

    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(e) => {
            debug!("Model answer is not valid JSON: {}", e);
            return None;
        }
    };

    if !value.is_object() {
        debug!("Model answer is JSON but not an object");
        return None;
    }

    serde_json::from_value(value)
        .map_err(|e| debug!("Model answer has an unusable shape: {}", e))
        .ok()
}

/// Decode `raw`, or build a placeholder from it.
pub fn parse_or_fallback<T, F>(raw: &str, fallback: F) -> StageOutput<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    match parse_object(raw) {
        Some(value) => StageOutput::Parsed(value),
        None => StageOutput::Fallback {
            value: fallback(raw),
            raw: raw.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq, Default)]
    struct Sample {
        #[serde(default)]
        goal: String,
    }

    #[test]
    fn test_plain_and_fenced_objects_decode() {
        let plain: Sample = parse_object(r#"{"goal": "x"}"#).unwrap();
        assert_eq!(plain.goal, "x");

        let fenced: Sample = parse_object("```json\n{\"goal\": \"y\"}\n```").unwrap();
        assert_eq!(fenced.goal, "y");
    }

    #[test]
    fn test_non_objects_are_rejected() {
        assert!(parse_object::<Value>("[1, 2]").is_none());
        assert!(parse_object::<Value>("42").is_none());
        assert!(parse_object::<Value>("Sure! Here is your JSON: {}").is_none());
        assert!(parse_object::<Value>(r#"{"goal": "cut off"#).is_none());
    }

    #[test]
    fn test_fallback_keeps_raw_text() {
        let out = parse_or_fallback("not json", |raw| Sample { goal: raw.to_uppercase() });
        assert!(out.is_fallback());
        assert_eq!(out.raw_text(), Some("not json"));
        assert_eq!(out.value().goal, "NOT JSON");

        let parsed = parse_or_fallback(r#"{"goal": "ok"}"#, |_| Sample::default());
        assert!(!parsed.is_fallback());
    }
}
