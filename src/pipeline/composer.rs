//! Plan Composer
//!
//! One model call turning a specification into an [`ImplementationPlan`].
//! The plan's content is not checked; "at least eight steps" is an
//! instruction to the model, nothing more.

use crate::ai::{InvokeOptions, SharedModel};
use crate::constants::compose::{MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::types::{ImplementationPlan, RefinedSpecification, Result, StageOutput};

use super::{ask, prompts, structured};

pub struct PlanComposer {
    model: SharedModel,
}

impl PlanComposer {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    pub async fn compose(
        &self,
        spec: &RefinedSpecification,
    ) -> Result<StageOutput<ImplementationPlan>> {
        tracing::info!("Composer: Planning '{}'", spec.title());

        let prompt = prompts::compose(&prompts::spec_json(spec));
        let options = InvokeOptions::default()
            .with_temperature(TEMPERATURE)
            .with_max_output_tokens(MAX_OUTPUT_TOKENS);
        let answer = ask(&self.model, "compose", &prompt, options).await?;

        let output = structured(answer, ImplementationPlan::fallback);

        if output.is_fallback() {
            tracing::warn!("Composer: Model answer was not a JSON object, using placeholder plan");
        } else {
            tracing::info!("Composer: Plan with {} steps", output.value().step_count());
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoke::test_support::{Reply, ScriptedProvider, scripted_client};
    use crate::types::{ErrorCategory, FALLBACK_ARCHITECTURE};
    use serde_json::json;

    fn spec() -> RefinedSpecification {
        RefinedSpecification {
            goal: "Homework tracker".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_parses_plan_and_sends_spec() {
        let answer = r#"{"architecture": "Flask + SPA", "implementation_steps": ["a", "b", "c"], "Budget": "0"}"#;
        let (model, provider) = scripted_client(ScriptedProvider::texts([answer]));

        let output = PlanComposer::new(model).compose(&spec()).await.unwrap();

        assert!(!output.is_fallback());
        assert_eq!(output.value().step_count(), 3);
        assert!(output.value().extra.contains_key("Budget"));

        let request = &provider.requests()[0];
        assert!(request.prompt.contains("\"goal\": \"Homework tracker\""));
        assert_eq!(request.temperature, TEMPERATURE);
        assert_eq!(request.max_output_tokens, MAX_OUTPUT_TOKENS);
    }

    #[tokio::test]
    async fn test_non_json_yields_placeholder_plan() {
        let (model, _) = scripted_client(ScriptedProvider::texts(["I cannot produce JSON today."]));

        let output = PlanComposer::new(model).compose(&spec()).await.unwrap();

        assert!(output.is_fallback());
        let plan = output.value();
        assert_eq!(plan.architecture, Some(json!(FALLBACK_ARCHITECTURE)));
        assert_eq!(plan.file_structure, Some(json!([])));
        assert_eq!(plan.implementation_steps, Some(json!([])));
        assert_eq!(plan.technology_stack, Some(json!({})));
        assert_eq!(plan.raw_plan.as_deref(), Some("I cannot produce JSON today."));
    }

    #[tokio::test]
    async fn test_json_array_is_not_a_plan() {
        let (model, _) = scripted_client(ScriptedProvider::texts(["[1, 2, 3]"]));

        let output = PlanComposer::new(model).compose(&spec()).await.unwrap();
        assert!(output.is_fallback());
    }

    #[tokio::test]
    async fn test_timeout_is_absorbed() {
        let (model, _) = scripted_client(ScriptedProvider::new(vec![Reply::Fail(ErrorCategory::Timeout)]));

        let output = PlanComposer::new(model).compose(&spec()).await.unwrap();
        assert!(output.is_fallback());
        assert!(output.raw_text().unwrap().contains("TIMEOUT"));
    }
}
