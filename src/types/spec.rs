//! Generation request and refined specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::utils::lenient;

/// Constraints assumed when the refiner cannot produce structured output
pub const DEFAULT_CONSTRAINTS: [&str; 2] = ["Deploy to Vercel", "Use free-tier services"];

/// Raw user intent at the start of a generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub raw_user_intent: String,
    pub context: Option<String>,
}

impl GenerationRequest {
    /// Blank context is treated as absent.
    pub fn new(raw_user_intent: impl Into<String>, context: Option<String>) -> Self {
        Self {
            raw_user_intent: raw_user_intent.into(),
            context: context.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Structured specification produced by the prompt refiner.
///
/// `goal` is never empty: the refiner substitutes the raw user intent when
/// the model omits it or answers with something that isn't JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinedSpecification {
    #[serde(deserialize_with = "lenient::string")]
    pub goal: String,
    #[serde(deserialize_with = "lenient::string")]
    pub audience: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub features: Vec<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub technical_requirements: Map<String, Value>,
    #[serde(deserialize_with = "lenient::object")]
    pub ui_requirements: Map<String, Value>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub constraints: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub success_criteria: Vec<String>,
    /// Unparsed model answer, kept for audit when structured parsing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_refinement: Option<String>,
}

impl RefinedSpecification {
    /// Placeholder specification built from the user's own words.
    pub fn fallback(user_intent: &str, raw: &str) -> Self {
        Self {
            goal: user_intent.to_string(),
            raw_refinement: Some(raw.to_string()),
            constraints: DEFAULT_CONSTRAINTS.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Project title used by templates
    pub fn title(&self) -> &str {
        let goal = self.goal.trim();
        if goal.is_empty() { "Generated System" } else { goal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_loosely_shaped_answer() {
        let raw = r#"{
            "goal": "Track homework",
            "features": [{"name": "Lists", "description": "Per-course lists"}, "Reminders"],
            "technical_requirements": ["Flask", "SQLite"],
            "constraints": "Free tier only"
        }"#;
        let spec: RefinedSpecification = serde_json::from_str(raw).unwrap();

        assert_eq!(spec.goal, "Track homework");
        assert_eq!(spec.features, vec!["Lists: Per-course lists", "Reminders"]);
        assert!(spec.technical_requirements.contains_key("details"));
        assert_eq!(spec.constraints, vec!["Free tier only"]);
        assert!(spec.audience.is_empty());
        assert!(spec.raw_refinement.is_none());
    }

    #[test]
    fn test_fallback_keeps_intent_and_raw_text() {
        let spec = RefinedSpecification::fallback("a todo app", "Sure! Here's a spec...");
        assert_eq!(spec.goal, "a todo app");
        assert_eq!(spec.raw_refinement.as_deref(), Some("Sure! Here's a spec..."));
        assert_eq!(spec.constraints.len(), 2);
        assert!(spec.features.is_empty());
    }

    #[test]
    fn test_blank_context_is_absent() {
        let req = GenerationRequest::new("idea", Some("   ".into()));
        assert!(req.context.is_none());
    }
}
