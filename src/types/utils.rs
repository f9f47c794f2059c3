//! Shared utility functions for type serialization and common operations.
//!
//! ## Lenient Deserializers
//!
//! Model output is only loosely shaped: a "list of features" may arrive as a
//! list of objects, a score as `"85"` or `84.5`. The helpers in [`lenient`]
//! accept those variants so one odd field doesn't discard an otherwise
//! usable answer.

use serde_json::Value;

// =============================================================================
// String Utilities
// =============================================================================

/// Take at most `max_chars` characters from the start of `s`.
///
/// Counts chars rather than bytes so multi-byte content never splits.
#[inline]
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Render an arbitrary JSON value as a single line of text.
///
/// Strings pass through; `{"name": .., "description": ..}` objects become
/// `"name: description"`; everything else is compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let title = ["name", "title", "feature", "issue"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str));
            let detail = ["description", "details", "detail", "fix"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str));
            match (title, detail) {
                (Some(t), Some(d)) => format!("{}: {}", t, d),
                (Some(t), None) => t.to_string(),
                (None, Some(d)) => d.to_string(),
                (None, None) => value.to_string(),
            }
        }
        other => other.to_string(),
    }
}

// =============================================================================
// Lenient Deserializers
// =============================================================================

pub mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::{Map, Value};

    use super::value_to_text;

    /// Any value as text; null becomes empty.
    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            other => value_to_text(&other),
        })
    }

    /// A list of text items. A bare string becomes a one-item list.
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(value_to_text)
                .collect(),
            Value::String(s) if s.trim().is_empty() => Vec::new(),
            other => vec![value_to_text(&other)],
        })
    }

    /// A JSON object. Non-object values are kept under a `details` key.
    pub fn object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("details".to_string(), other);
                map
            }
        })
    }

    /// Score given to a present but unreadable value (`"N/A"`, `null`).
    /// Low enough that the issue lists, not the score, decide what happens next.
    pub const UNREADABLE_SCORE: u8 = 0;

    /// A 0-100 score from a number, numeric string (`"85"`, `"85%"`) or
    /// fraction (`"7/10"`), rounded and clamped. Never fails: anything else
    /// becomes [`UNREADABLE_SCORE`] so the rest of the object survives.
    pub fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_score_text(&s),
            _ => None,
        };
        Ok(raw
            .filter(|n| n.is_finite())
            .map_or(UNREADABLE_SCORE, |n| n.round().clamp(0.0, 100.0) as u8))
    }

    fn parse_score_text(text: &str) -> Option<f64> {
        let text = text.trim().trim_end_matches('%').trim();
        match text.split_once('/') {
            Some((num, den)) => {
                let num = num.trim().parse::<f64>().ok()?;
                let den = den.trim().parse::<f64>().ok()?;
                (den > 0.0).then(|| num / den * 100.0)
            }
            None => text.parse::<f64>().ok(),
        }
    }

    /// A boolean from a bool, "true"/"yes" string or non-zero number.
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Bool(b) => b,
            Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y"),
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => false,
        })
    }
}
