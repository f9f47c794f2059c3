//! Prompt Refiner
//!
//! Turns a raw idea into a [`RefinedSpecification`]. Always yields a
//! specification: unparseable answers and upstream failures become a
//! placeholder built from the user's own words.

use crate::ai::{InvokeOptions, SharedModel};
use crate::constants::refine::TEMPERATURE;
use crate::types::{ForgeError, GenerationRequest, RefinedSpecification, Result, StageOutput};

use super::{ask, prompts, structured};

pub struct PromptRefiner {
    model: SharedModel,
}

impl PromptRefiner {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    pub async fn refine(
        &self,
        request: &GenerationRequest,
    ) -> Result<StageOutput<RefinedSpecification>> {
        let intent = request.raw_user_intent.trim();
        if intent.is_empty() {
            return Err(ForgeError::invalid("Prompt is required"));
        }

        tracing::info!("Refiner: Refining {} chars of user intent", intent.chars().count());

        let prompt = prompts::refine(&request.raw_user_intent, request.context.as_deref());
        let options = InvokeOptions::default().with_temperature(TEMPERATURE);
        let answer = ask(&self.model, "refine", &prompt, options).await?;

        let output = structured(answer, |raw| {
            RefinedSpecification::fallback(&request.raw_user_intent, raw)
        })
        .map(|mut spec| {
            if spec.goal.trim().is_empty() {
                spec.goal = request.raw_user_intent.clone();
            }
            spec
        });

        if output.is_fallback() {
            tracing::warn!("Refiner: Model answer was not a JSON object, using placeholder specification");
        } else {
            tracing::info!(
                "Refiner: Specification with {} features",
                output.value().features.len()
            );
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoke::test_support::{Reply, ScriptedProvider, scripted_client};
    use crate::types::{DEFAULT_CONSTRAINTS, ErrorCategory};

    fn request(intent: &str) -> GenerationRequest {
        GenerationRequest::new(intent, None)
    }

    #[tokio::test]
    async fn test_parses_fenced_json() {
        let answer = "```json\n{\"goal\": \"Homework tracker\", \"features\": [\"Lists\"]}\n```";
        let (model, provider) = scripted_client(ScriptedProvider::texts([answer]));

        let output = PromptRefiner::new(model).refine(&request("a todo app")).await.unwrap();

        assert!(!output.is_fallback());
        assert_eq!(output.value().goal, "Homework tracker");
        assert_eq!(provider.requests()[0].temperature, TEMPERATURE);
    }

    #[tokio::test]
    async fn test_prose_answer_falls_back_to_intent() {
        let raw = "Sure! Here's what I'd build: a todo app with lists.";
        let (model, _) = scripted_client(ScriptedProvider::texts([raw]));

        let output = PromptRefiner::new(model).refine(&request("a todo app")).await.unwrap();

        assert!(output.is_fallback());
        let spec = output.value();
        assert_eq!(spec.goal, "a todo app");
        assert_eq!(spec.raw_refinement.as_deref(), Some(raw));
        assert_eq!(spec.constraints, DEFAULT_CONSTRAINTS.map(String::from).to_vec());
        assert!(spec.features.is_empty());
        assert!(spec.technical_requirements.is_empty());
    }

    #[tokio::test]
    async fn test_blank_goal_is_replaced_by_intent() {
        let (model, _) = scripted_client(ScriptedProvider::texts([r#"{"goal": "  ", "audience": "students"}"#]));

        let output = PromptRefiner::new(model).refine(&request("a todo app")).await.unwrap();

        assert!(!output.is_fallback());
        assert_eq!(output.value().goal, "a todo app");
        assert_eq!(output.value().audience, "students");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_absorbed() {
        let (model, _) = scripted_client(ScriptedProvider::new(vec![Reply::Fail(ErrorCategory::Network)]));

        let output = PromptRefiner::new(model).refine(&request("a todo app")).await.unwrap();

        assert!(output.is_fallback());
        assert_eq!(output.value().goal, "a todo app");
    }

    #[tokio::test]
    async fn test_blank_intent_is_rejected_without_a_call() {
        let (model, provider) = scripted_client(ScriptedProvider::texts(["{}"]));

        let err = PromptRefiner::new(model).refine(&request("  ")).await.unwrap_err();

        assert!(matches!(err, ForgeError::InvalidRequest(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_propagates() {
        let model = std::sync::Arc::new(crate::ai::ModelClient::unconfigured("no key"));

        let err = PromptRefiner::new(model).refine(&request("a todo app")).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
