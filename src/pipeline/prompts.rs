//! Prompt templates for every model-backed stage.
//!
//! Builders are pure functions of their inputs so stage tests can assert on
//! exactly what was sent.

use crate::types::{FileSet, ImplementationPlan, RefinedSpecification, truncate_chars};

/// Refine a raw idea into a structured specification
pub fn refine(user_intent: &str, context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an expert system architect and prompt engineer. \
         Refine the following user request into a comprehensive, detailed \
         specification for building a software system.\n\n",
    );
    prompt.push_str(&format!("User Request:\n{}\n\n", user_intent));
    if let Some(context) = context {
        prompt.push_str(&format!("Additional Context: {}\n\n", context));
    }
    prompt.push_str(
        "Provide a refined specification that includes:\n\
         1. **Project Goal**: Clear, specific objective\n\
         2. **Target Audience**: Who will use this system\n\
         3. **Core Features**: Detailed list (minimum 5)\n\
         4. **Technical Requirements**: Language, framework, database, auth\n\
         5. **UI/UX Requirements**: Design style, responsiveness\n\
         6. **Constraints**: Hosting (Vercel), performance, scalability\n\
         7. **Success Criteria**: Measurable outcomes\n\n\
         Output as structured JSON with keys: goal, audience, features (array), \
         technical_requirements (object), ui_requirements (object), \
         constraints (array), success_criteria (array).",
    );
    prompt
}

/// Turn a specification into an implementation plan
pub fn compose(spec_json: &str) -> String {
    format!(
        "You are a senior software architect. Create a detailed implementation \
         plan for this system:\n\n{}\n\n\
         Include:\n\
         1. Architecture Overview\n\
         2. File Structure\n\
         3. Implementation Steps (minimum 8)\n\
         4. Technology Stack\n\
         5. Data Models\n\
         6. API Endpoints\n\
         7. Security Measures\n\
         8. Deployment Strategy (Vercel)\n\
         9. Testing Strategy\n\
         10. Risk Assessment\n\n\
         Output as detailed JSON.",
        spec_json
    )
}

/// Generate the backend source file
pub fn backend(filename: &str, plan_json: &str, spec_json: &str) -> String {
    format!(
        "Generate a complete, production-ready Flask backend ({}):\n\n\
         Plan: {}\nSpec: {}\n\n\
         Requirements: Flask, JWT auth, Supabase, env vars, CORS, rate limiting.\n\
         Output ONLY the complete Python code.",
        filename, plan_json, spec_json
    )
}

/// Generate the single-page interface
pub fn interface(plan_json: &str, spec_json: &str) -> String {
    format!(
        "Generate a complete, mobile-first web interface:\n\n\
         Plan: {}\nSpec: {}\n\n\
         Requirements: Single HTML, responsive, dark theme, API integration, JWT auth.\n\
         Output ONLY the complete HTML code.",
        plan_json, spec_json
    )
}

/// Review a generated file set. Only names and sizes are shown, not content.
pub fn review(files: &FileSet, plan: &ImplementationPlan, plan_excerpt_chars: usize) -> String {
    let listing = files
        .iter()
        .map(|(name, content)| format!("- {} ({} chars)", name, content.chars().count()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a senior code reviewer. Review this system:\n\n\
         Files:\n{}\n\nPlan:\n{}\n\n\
         Review for: security, quality, completeness, best practices, Vercel readiness.\n\
         Output JSON: overall_score (0-100), security_issues, quality_issues, \
         missing_features, recommendations, deployment_ready, summary.",
        listing,
        plan.excerpt(plan_excerpt_chars)
    )
}

/// Rewrite one file to address review issues
pub fn refactor(issues: &[&str], source: &str, max_source_chars: usize) -> String {
    let issue_list = issues
        .iter()
        .map(|issue| format!("- {}", issue))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Refactor this code to fix:\n{}\n\nCode:\n```\n{}\n```\n\
         Output ONLY the complete refactored code.",
        issue_list,
        truncate_chars(source, max_source_chars)
    )
}

/// Pretty JSON for embedding in prompts
pub(crate) fn spec_json(spec: &RefinedSpecification) -> String {
    serde_json::to_string_pretty(spec).unwrap_or_default()
}

pub(crate) fn plan_json(plan: &ImplementationPlan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_default()
}
