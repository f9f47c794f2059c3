//! Refine Command
//!
//! Turn a free-text idea into a structured specification.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, write_json};
use crate::service::RefineRequest;
use crate::types::Result;

pub struct RefineOptions {
    pub prompt: String,
    pub context: Option<String>,
    pub project: Option<String>,
    pub out: Option<PathBuf>,
}

pub async fn run(options: RefineOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let project_id = match &options.project {
        Some(name) => Some(ctx.ensure_project(name, Some(options.prompt.trim()))?),
        None => None,
    };

    let response = ctx
        .service()
        .refine(RefineRequest {
            prompt: options.prompt,
            context: options.context,
            project_id,
        })
        .await?;

    if response.fallback {
        Output::new().warning("Model answer was not structured; specification built from the prompt");
    }
    if let Some(iteration) = response.iteration {
        tracing::info!("Recorded iteration {}", iteration);
    }

    write_json(&response.refined, options.out.as_deref())?;
    if let Some(out) = &options.out {
        Output::new().success(&format!("Specification written to {}", out.display()));
    }
    Ok(())
}
