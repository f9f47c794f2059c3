//! Tagged stage results.
//!
//! A stage that asks the model for structured data either got it
//! (`Parsed`) or substituted a placeholder (`Fallback`). Both carry a usable
//! value; only the tag tells them apart.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput<T> {
    /// The model answered with the expected structure
    Parsed(T),
    /// Placeholder built from the raw, unparseable answer
    Fallback { value: T, raw: String },
}

impl<T> StageOutput<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Parsed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Raw model text behind a fallback
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Parsed(_) => None,
            Self::Fallback { raw, .. } => Some(raw),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutput<U> {
        match self {
            Self::Parsed(value) => StageOutput::Parsed(f(value)),
            Self::Fallback { value, raw } => StageOutput::Fallback { value: f(value), raw },
        }
    }
}

/// Serialized form exposes only the value; the tag travels separately.
impl<T: Serialize> Serialize for StageOutput<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let parsed = StageOutput::Parsed(1);
        assert!(!parsed.is_fallback());
        assert_eq!(parsed.raw_text(), None);

        let fallback = StageOutput::Fallback { value: 2, raw: "oops".to_string() };
        assert!(fallback.is_fallback());
        assert_eq!(fallback.raw_text(), Some("oops"));
        assert_eq!(*fallback.value(), 2);
        assert_eq!(fallback.map(|v| v * 10).into_value(), 20);
    }
}
