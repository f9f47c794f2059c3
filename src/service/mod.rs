//! Generation Service
//!
//! The three caller-facing operations (refine, plan, generate), with request
//! validation ahead of any model call and optional persistence of every
//! stage output. Requests and responses are serde types so a transport
//! layer can pass JSON straight through.

mod health;
mod payload;

pub use health::HealthReport;
pub use payload::ErrorPayload;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pipeline::GenerationPipeline;
use crate::storage::SharedStore;
use crate::types::{
    ForgeError, GenerationRequest, ImplementationPlan, RefactorStatus, RefinedSpecification,
    Result, ReviewVerdict,
};

// =============================================================================
// Requests / Responses
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefineRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefineResponse {
    pub refined: RefinedSpecification,
    pub original: String,
    /// True when `refined` is a placeholder built from the prompt itself
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub refined_spec: Option<RefinedSpecification>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub plan: ImplementationPlan,
    pub fallback: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub plan: Option<ImplementationPlan>,
    #[serde(default)]
    pub refined_spec: Option<RefinedSpecification>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    /// Character count per generated filename
    pub files: BTreeMap<String, usize>,
    pub review: ReviewVerdict,
    pub review_fallback: bool,
    pub refactor_message: String,
    pub refactor_status: RefactorStatus,
    pub total_files: usize,
}

// =============================================================================
// Service
// =============================================================================

pub struct GenerationService {
    pipeline: GenerationPipeline,
    store: Option<SharedStore>,
}

impl GenerationService {
    pub fn new(pipeline: GenerationPipeline) -> Self {
        Self {
            pipeline,
            store: None,
        }
    }

    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Store to record into, when the request names an existing project
    fn store_for(&self, project_id: Option<i64>) -> Result<Option<(&SharedStore, i64)>> {
        let (Some(store), Some(id)) = (&self.store, project_id) else {
            return Ok(None);
        };
        if store.get_project(id)?.is_none() {
            tracing::warn!("Project {} not found, results will not be recorded", id);
            return Ok(None);
        }
        Ok(Some((store, id)))
    }

    pub async fn refine(&self, request: RefineRequest) -> Result<RefineResponse> {
        let original = request.prompt.trim().to_string();
        if original.is_empty() {
            return Err(ForgeError::invalid("Prompt is required"));
        }

        let generation = GenerationRequest::new(original.clone(), request.context);
        let output = self.pipeline.refine(&generation).await?;
        let fallback = output.is_fallback();
        let refined = output.into_value();

        let iteration = match self.store_for(request.project_id)? {
            Some((store, id)) => Some(store.record_refinement(id, &refined)?),
            None => None,
        };

        Ok(RefineResponse {
            refined,
            original,
            fallback,
            iteration,
        })
    }

    pub async fn plan(&self, request: PlanRequest) -> Result<PlanResponse> {
        let spec = request
            .refined_spec
            .ok_or_else(|| ForgeError::invalid("Refined specification is required"))?;
        if spec == RefinedSpecification::default() {
            return Err(ForgeError::invalid("Refined specification is required"));
        }

        let output = self.pipeline.compose(&spec).await?;
        let fallback = output.is_fallback();
        let plan = output.into_value();

        if let Some((store, id)) = self.store_for(request.project_id)? {
            store.record_plan(id, &plan)?;
        }

        Ok(PlanResponse { plan, fallback })
    }

    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let (Some(plan), Some(spec)) = (request.plan, request.refined_spec) else {
            return Err(ForgeError::invalid(
                "Plan and refined specification are required",
            ));
        };
        if plan.is_empty() || spec == RefinedSpecification::default() {
            return Err(ForgeError::invalid(
                "Plan and refined specification are required",
            ));
        }

        let build = self.pipeline.build(&plan, &spec).await?;

        if let Some((store, id)) = self.store_for(request.project_id)? {
            store.record_generation(id, build.files(), build.review.value())?;
        }

        let review_fallback = build.review.is_fallback();
        let files = build.outcome.files;

        Ok(GenerateResponse {
            files: files.sizes(),
            total_files: files.len(),
            review: build.review.into_value(),
            review_fallback,
            refactor_message: build.outcome.message,
            refactor_status: build.outcome.status,
        })
    }
}
