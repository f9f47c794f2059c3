//! Generation Pipeline
//!
//! Five stages run strictly in sequence, each awaiting the previous one:
//!
//! ```text
//! GenerationRequest
//!   → PromptRefiner  → RefinedSpecification   (fallback on bad JSON)
//!   → PlanComposer   → ImplementationPlan     (fallback on bad JSON)
//!   → FileGenerator  → FileSet                (model failure aborts)
//!   → CodeReviewer   → ReviewVerdict          (fallback on bad JSON)
//!   → Refactorer     → RefactorOutcome        (per-file failure keeps original)
//! ```
//!
//! Stages share one [`SharedModel`] read-only and hold no mutable state.
//! Nothing is retried.

pub mod composer;
pub mod generator;
pub mod prompts;
pub mod refactorer;
pub mod refiner;
pub mod reviewer;
pub mod scaffold;

pub use composer::PlanComposer;
pub use generator::FileGenerator;
pub use refactorer::Refactorer;
pub use refiner::PromptRefiner;
pub use reviewer::CodeReviewer;

use serde::de::DeserializeOwned;

use crate::ai::{InvokeOptions, ModelClient, SharedModel, parse_or_fallback};
use crate::config::Config;
use crate::types::{
    FileSet, ForgeError, GenerationRequest, ImplementationPlan, RefactorOutcome,
    RefinedSpecification, Result, ReviewVerdict, StageOutput,
};

// =============================================================================
// Stage Helpers
// =============================================================================

/// What a structured stage got back from the model
pub(crate) enum Answer {
    Text(String),
    /// The call failed upstream; carries the error text
    Failed(String),
}

/// Call the model for a stage that can fall back.
///
/// Upstream failures and timeouts become [`Answer::Failed`]. A missing
/// backend or an invalid request still propagates.
pub(crate) async fn ask(
    model: &ModelClient,
    stage: &str,
    prompt: &str,
    options: InvokeOptions,
) -> Result<Answer> {
    match model.invoke(prompt, options).await {
        Ok(text) => Ok(Answer::Text(text)),
        Err(e @ (ForgeError::Upstream(_) | ForgeError::Timeout { .. })) => {
            tracing::warn!("{}: Model call failed, falling back: {}", stage, e);
            Ok(Answer::Failed(e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Decode an answer, or build the stage's placeholder from its raw text
pub(crate) fn structured<T, F>(answer: Answer, fallback: F) -> StageOutput<T>
where
    T: DeserializeOwned,
    F: FnOnce(&str) -> T,
{
    match answer {
        Answer::Text(raw) => parse_or_fallback(&raw, fallback),
        Answer::Failed(reason) => StageOutput::Fallback {
            value: fallback(&reason),
            raw: reason,
        },
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Results of the build half: generate, review, refactor
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub review: StageOutput<ReviewVerdict>,
    pub outcome: RefactorOutcome,
}

impl BuildResult {
    pub fn files(&self) -> &FileSet {
        &self.outcome.files
    }
}

/// Results of a full end-to-end run
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub spec: StageOutput<RefinedSpecification>,
    pub plan: StageOutput<ImplementationPlan>,
    pub build: BuildResult,
}

/// All five stages wired to one model client
pub struct GenerationPipeline {
    refiner: PromptRefiner,
    composer: PlanComposer,
    generator: FileGenerator,
    reviewer: CodeReviewer,
    refactorer: Refactorer,
    halt_on_fallback: bool,
}

impl GenerationPipeline {
    pub fn new(model: SharedModel, config: &Config) -> Self {
        Self {
            refiner: PromptRefiner::new(model.clone()),
            composer: PlanComposer::new(model.clone()),
            generator: FileGenerator::new(model.clone(), config.generation.clone()),
            reviewer: CodeReviewer::new(model.clone(), config.review.clone()),
            refactorer: Refactorer::new(model, config.generation.clone()),
            halt_on_fallback: config.pipeline.halt_on_fallback,
        }
    }

    pub async fn refine(
        &self,
        request: &GenerationRequest,
    ) -> Result<StageOutput<RefinedSpecification>> {
        let spec = self.refiner.refine(request).await?;
        self.check_degraded("refine", &spec)?;
        Ok(spec)
    }

    pub async fn compose(
        &self,
        spec: &RefinedSpecification,
    ) -> Result<StageOutput<ImplementationPlan>> {
        let plan = self.composer.compose(spec).await?;
        self.check_degraded("compose", &plan)?;
        Ok(plan)
    }

    /// Generate files from a plan, review them and refactor if needed
    pub async fn build(
        &self,
        plan: &ImplementationPlan,
        spec: &RefinedSpecification,
    ) -> Result<BuildResult> {
        let files = self.generator.generate(plan, spec).await?;
        let review = self.reviewer.review(&files, plan, spec).await?;
        let outcome = self.refactorer.refactor(files, review.value()).await?;

        tracing::info!("Pipeline: {}", outcome.message);
        Ok(BuildResult { review, outcome })
    }

    /// Every stage, end to end
    pub async fn run(&self, request: &GenerationRequest) -> Result<PipelineRun> {
        let spec = self.refine(request).await?;
        let plan = self.compose(spec.value()).await?;
        let build = self.build(plan.value(), spec.value()).await?;

        Ok(PipelineRun { spec, plan, build })
    }

    fn check_degraded<T>(&self, stage: &str, output: &StageOutput<T>) -> Result<()> {
        if self.halt_on_fallback && output.is_fallback() {
            tracing::warn!("Pipeline: Halting, {} produced a placeholder", stage);
            return Err(ForgeError::DegradedStage {
                stage: stage.to_string(),
            });
        }
        Ok(())
    }
}
