//! Project store boundary.
//!
//! The pipeline never touches storage itself; the service layer records
//! stage outputs through [`ProjectStore`] when the caller names a project.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::types::{FileSet, ImplementationPlan, RefinedSpecification, Result, ReviewVerdict};

/// Shared store handle
pub type SharedStore = Arc<dyn ProjectStore>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    pub goal: Option<String>,
    /// `draft` until files are generated, then `generated`
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One refine → plan → generate pass over a project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    pub project_id: i64,
    pub iteration_number: u32,
    pub refined_prompt: Option<Value>,
    pub plan: Option<Value>,
    pub review_notes: Option<Value>,
    pub created_at: String,
}

pub trait ProjectStore: Send + Sync {
    /// Create a project in `draft` status and return its id
    fn create_project(&self, name: &str, goal: Option<&str>) -> Result<i64>;

    fn get_project(&self, project_id: i64) -> Result<Option<ProjectRecord>>;

    fn find_project(&self, name: &str) -> Result<Option<ProjectRecord>>;

    fn list_projects(&self) -> Result<Vec<ProjectRecord>>;

    /// Start a new iteration (numbered from 1) holding the refined specification
    fn record_refinement(&self, project_id: i64, spec: &RefinedSpecification) -> Result<u32>;

    /// Attach a plan to the latest iteration. False when there is none.
    fn record_plan(&self, project_id: i64, plan: &ImplementationPlan) -> Result<bool>;

    /// Attach a review to the latest iteration. False when there is none.
    fn record_review(&self, project_id: i64, verdict: &ReviewVerdict) -> Result<bool>;

    /// Replace every stored file of the project and mark it `generated`
    fn replace_files(&self, project_id: i64, files: &FileSet) -> Result<()>;

    /// `replace_files` plus `record_review` in one commit: either both land
    /// or neither does. Returns whether an iteration took the review.
    fn record_generation(
        &self,
        project_id: i64,
        files: &FileSet,
        verdict: &ReviewVerdict,
    ) -> Result<bool>;

    fn load_files(&self, project_id: i64) -> Result<FileSet>;

    fn latest_iteration(&self, project_id: i64) -> Result<Option<IterationRecord>>;

    /// Cheap connectivity check
    fn ping(&self) -> Result<()>;
}
