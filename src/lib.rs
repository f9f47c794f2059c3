//! sysforge - Idea to Deployable Web Project
//!
//! Turns a one-line idea into a small web application by chaining model
//! calls: refine the idea into a specification, compose a plan, generate
//! the backend and UI, review the result and rewrite critical files when
//! the review finds problems.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sysforge::{Config, GenerationPipeline, GenerationRequest, ModelClient};
//!
//! let config = Config::default();
//! let model = Arc::new(ModelClient::from_config(&config.llm)?);
//! let pipeline = GenerationPipeline::new(model, &config);
//! let run = pipeline
//!     .run(&GenerationRequest::new("a todo app for students", None))
//!     .await?;
//! println!("{}", run.build.outcome.message);
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: model backends, invocation, fence stripping, structured decoding
//! - [`pipeline`]: the five generation stages
//! - [`service`]: validated request/response operations with persistence
//! - [`storage`]: SQLite project store and file export
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod service;
pub mod storage;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, ErrorClass, ForgeError, Result, ResultExt};

// Domain
pub use types::{
    FileSet, GenerationRequest, ImplementationPlan, RefactorOutcome, RefinedSpecification,
    ReviewVerdict, StageOutput,
};

// Storage
pub use storage::{Database, ProjectStore, SharedDatabase, export_files};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{
    CodeReviewer, FileGenerator, GenerationPipeline, PlanComposer, PromptRefiner, Refactorer,
};
pub use service::{ErrorPayload, GenerationService, HealthReport};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{InvokeOptions, LlmProvider, ModelClient, SharedModel, strip_code_fence, with_timeout};
