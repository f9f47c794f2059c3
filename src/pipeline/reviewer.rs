//! Code Reviewer
//!
//! Scores a generated file set. The model only sees filenames, their sizes
//! and a plan excerpt, never file content, which keeps the prompt bounded.

use crate::ai::{InvokeOptions, SharedModel};
use crate::config::ReviewConfig;
use crate::constants::review::TEMPERATURE;
use crate::types::{
    FileSet, ImplementationPlan, RefinedSpecification, Result, ReviewVerdict, StageOutput,
};

use super::{ask, prompts, structured};

pub struct CodeReviewer {
    model: SharedModel,
    config: ReviewConfig,
}

impl CodeReviewer {
    pub fn new(model: SharedModel, config: ReviewConfig) -> Self {
        Self { model, config }
    }

    /// `spec` is accepted for symmetry with the other stages; the prompt
    /// deliberately leaves it out.
    pub async fn review(
        &self,
        files: &FileSet,
        plan: &ImplementationPlan,
        _spec: &RefinedSpecification,
    ) -> Result<StageOutput<ReviewVerdict>> {
        tracing::info!("Reviewer: Reviewing {} files", files.len());

        let prompt = prompts::review(files, plan, self.config.plan_excerpt_chars);
        let options = InvokeOptions::default().with_temperature(TEMPERATURE);
        let answer = ask(&self.model, "review", &prompt, options).await?;

        let policy = self.config.fallback_policy;
        let output = structured(answer, |raw| ReviewVerdict::fallback(raw, policy));

        let verdict = output.value();
        if output.is_fallback() {
            tracing::warn!(
                "Reviewer: Model answer was not a JSON object, reporting {} fallback (score {})",
                policy,
                verdict.overall_score
            );
        } else {
            tracing::info!(
                "Reviewer: Score {} with {} security and {} quality issues",
                verdict.overall_score,
                verdict.security_issues.len(),
                verdict.quality_issues.len()
            );
        }

        Ok(output)
    }
}
