//! Plan Command
//!
//! Compose an implementation plan from a specification file.

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_json, write_json};
use crate::service::PlanRequest;
use crate::types::Result;

pub async fn run(spec: PathBuf, project: Option<String>, out: Option<PathBuf>) -> Result<()> {
    let ctx = CommandContext::load()?;
    let project_id = project
        .as_deref()
        .map(|name| ctx.require_project(name))
        .transpose()?;

    let response = ctx
        .service()
        .plan(PlanRequest {
            refined_spec: Some(read_json(&spec)?),
            project_id,
        })
        .await?;

    if response.fallback {
        Output::new().warning("Model answer was not structured; plan holds the raw text");
    }

    write_json(&response.plan, out.as_deref())?;
    if let Some(out) = &out {
        Output::new().success(&format!("Plan written to {}", out.display()));
    }
    Ok(())
}
