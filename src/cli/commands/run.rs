//! Run Command
//!
//! All five stages end to end, from a free-text idea to a file set.

use std::path::PathBuf;
use std::time::Instant;

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::storage::{ProjectStore, export_files};
use crate::types::{GenerationRequest, Result};

pub struct RunOptions {
    pub prompt: String,
    pub context: Option<String>,
    pub project: Option<String>,
    pub out: Option<PathBuf>,
}

pub async fn run(options: RunOptions) -> Result<()> {
    let ctx = CommandContext::load()?;
    let output = Output::new();
    let start = Instant::now();

    output.header("sysforge");
    output.field("Backend", ctx.model.backend_name().unwrap_or_else(|| "none".into()));

    let request = GenerationRequest::new(options.prompt.trim(), options.context);
    let result = ctx.pipeline().run(&request).await?;

    output.section("Specification");
    output.field("Goal", result.spec.value().title());
    output.field("Features", result.spec.value().features.len());
    if result.spec.is_fallback() {
        output.warning("Specification is a placeholder built from the prompt");
    }

    output.section("Plan");
    output.field(
        "Architecture",
        result.plan.value().architecture_text().unwrap_or_default(),
    );
    output.field("Steps", result.plan.value().step_count());
    if result.plan.is_fallback() {
        output.warning("Plan is a placeholder holding the raw model answer");
    }

    let build = &result.build;
    output.files(&build.files().sizes());
    output.review(build.review.value(), build.review.is_fallback());
    output.info(&build.outcome.message);

    if let Some(name) = &options.project {
        let id = ctx.ensure_project(name, Some(&request.raw_user_intent))?;
        ctx.db.record_refinement(id, result.spec.value())?;
        ctx.db.record_plan(id, result.plan.value())?;
        ctx.db.record_generation(id, build.files(), build.review.value())?;
        output.success(&format!("Saved to project '{}'", name));
    }

    if let Some(out) = &options.out {
        let written = export_files(build.files(), out)?;
        output.success(&format!("Wrote {} files to {}", written.len(), out.display()));
    }

    output.success(&format!("Done in {:.1}s", start.elapsed().as_secs_f64()));
    Ok(())
}
