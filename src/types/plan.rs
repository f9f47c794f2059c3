//! Implementation plan produced by the plan composer.
//!
//! Plans are loosely typed: every well-known key is optional and holds
//! whatever JSON the model chose for it. Unknown keys are preserved.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::utils::{truncate_chars, value_to_text};

/// Architecture used when the composer cannot produce a structured plan
pub const FALLBACK_ARCHITECTURE: &str = "Modern web application";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_structure: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_steps: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology_stack: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_models: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoints: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_measures: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_strategy: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing_strategy: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<Value>,
    /// Unparsed model answer, kept for audit when structured parsing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_plan: Option<String>,
    /// Keys the model added beyond the well-known ones
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImplementationPlan {
    /// Minimal placeholder plan
    pub fn fallback(raw: &str) -> Self {
        Self {
            architecture: Some(Value::String(FALLBACK_ARCHITECTURE.to_string())),
            file_structure: Some(json!([])),
            implementation_steps: Some(json!([])),
            technology_stack: Some(json!({})),
            raw_plan: Some(raw.to_string()),
            ..Default::default()
        }
    }

    /// Architecture rendered as text, if the plan has one
    pub fn architecture_text(&self) -> Option<String> {
        self.architecture
            .as_ref()
            .filter(|v| !v.is_null())
            .map(value_to_text)
    }

    /// Number of implementation steps, when given as a list
    pub fn step_count(&self) -> usize {
        self.implementation_steps
            .as_ref()
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// True when no key at all is present
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Pretty JSON of the plan cut to `max_chars`, with an ellipsis when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        let full = serde_json::to_string_pretty(self).unwrap_or_default();
        let cut = truncate_chars(&full, max_chars);
        if cut.len() < full.len() {
            format!("{}...", cut)
        } else {
            full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_are_preserved() {
        let raw = r#"{"architecture": {"name": "MVC", "description": "Flask + HTML"}, "Milestones": [1, 2]}"#;
        let plan: ImplementationPlan = serde_json::from_str(raw).unwrap();

        assert_eq!(plan.architecture_text().as_deref(), Some("MVC: Flask + HTML"));
        assert!(plan.extra.contains_key("Milestones"));

        let back = serde_json::to_value(&plan).unwrap();
        assert_eq!(back["Milestones"], json!([1, 2]));
        assert!(back.get("raw_plan").is_none());
    }

    #[test]
    fn test_fallback_has_architecture() {
        let plan = ImplementationPlan::fallback("not json");
        assert_eq!(plan.architecture_text().as_deref(), Some(FALLBACK_ARCHITECTURE));
        assert_eq!(plan.step_count(), 0);
        assert_eq!(plan.raw_plan.as_deref(), Some("not json"));
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let plan = ImplementationPlan::fallback(&"x".repeat(5000));
        let excerpt = plan.excerpt(1000);
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), 1003);
        assert!(ImplementationPlan::default().is_empty());
    }
}
