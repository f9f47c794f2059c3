//! Deterministic supporting files.
//!
//! Built from templates and specification data only, so a project is
//! self-describing even when both model-generated files are junk.

use serde_json::json;

use crate::types::{FileSet, RefinedSpecification};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const DEPLOY_FILE: &str = "vercel.json";
pub const README_FILE: &str = "README.md";
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

const REQUIREMENTS: &str = "Flask==3.0.3\n\
                            Flask-CORS==5.0.0\n\
                            flask-limiter>=2.9,<3.0\n\
                            PyJWT==2.8.0\n\
                            google-generativeai==0.8.3\n\
                            supabase>=2.11.0,<3.0.0\n\
                            python-dotenv==1.0.0\n";

/// Credentials the generated backend reads, with placeholder values
const REQUIRED_ENV: [(&str, &str, &str); 4] = [
    ("GEMINI_KEY", "@gemini_key", "your_gemini_api_key_here"),
    ("SUPABASE_URL", "@supabase_url", "your_supabase_project_url"),
    ("SUPABASE_KEY", "@supabase_key", "your_supabase_anon_key"),
    ("JWT_SECRET", "@jwt_secret", "your_random_secret_key_min_32_chars"),
];

/// Add every supporting file to `files`. `backend_file` is the entry point
/// the deployment descriptor routes to.
pub fn add_supporting_files(files: &mut FileSet, spec: &RefinedSpecification, backend_file: &str) {
    files.insert(REQUIREMENTS_FILE, REQUIREMENTS);
    files.insert(DEPLOY_FILE, deployment_descriptor(backend_file));
    files.insert(README_FILE, readme(spec, backend_file));
    files.insert(ENV_EXAMPLE_FILE, env_example());
}

fn deployment_descriptor(backend_file: &str) -> String {
    let env: serde_json::Map<String, serde_json::Value> = REQUIRED_ENV
        .iter()
        .map(|(name, secret, _)| (name.to_string(), json!(secret)))
        .collect();

    let descriptor = json!({
        "version": 2,
        "builds": [{"src": backend_file, "use": "@vercel/python"}],
        "routes": [{"src": "/(.*)", "dest": backend_file}],
        "env": env,
    });

    serde_json::to_string_pretty(&descriptor).unwrap_or_default()
}

fn readme(spec: &RefinedSpecification, backend_file: &str) -> String {
    let features = spec
        .features
        .iter()
        .map(|f| format!("- {}", f))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "# {}\n\n## Features\n{}\n\n\
         ## Quick Start\n```bash\npip install -r requirements.txt\npython {}\n```\n\n\
         ## Deploy\n```bash\nvercel --prod\n```\n\n\
         *Generated by sysforge*\n",
        spec.title(),
        features,
        backend_file
    )
}

fn env_example() -> String {
    REQUIRED_ENV
        .iter()
        .map(|(name, _, placeholder)| format!("{}={}\n", name, placeholder))
        .collect()
}
