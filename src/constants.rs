//! Global Constants
//!
//! Centralized constants for model calls and stage tuning.
//! All magic numbers should be defined here with documentation.

/// Model invocation defaults
pub mod invoke {
    /// Temperature when a caller doesn't choose one
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Output token budget when a caller doesn't choose one
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4000;
}

/// Prompt refiner tuning
pub mod refine {
    pub const TEMPERATURE: f32 = 0.3;
}

/// Plan composer tuning
pub mod compose {
    pub const TEMPERATURE: f32 = 0.2;

    /// Plans are large; give them more room than the default
    pub const MAX_OUTPUT_TOKENS: u32 = 6000;
}

/// File generator tuning
pub mod generate {
    /// Output budget for each model-generated source file
    pub const FILE_MAX_TOKENS: u32 = 8000;
}

/// Code reviewer tuning
pub mod review {
    pub const TEMPERATURE: f32 = 0.3;

    /// Characters of the pretty-printed plan included in the review prompt
    pub const PLAN_EXCERPT_CHARS: usize = 1000;
}

/// Refactorer tuning
pub mod refactor {
    /// Combined issues passed to each rewrite prompt
    pub const MAX_ISSUES: usize = 5;

    /// Characters of the original file included in each rewrite prompt
    pub const MAX_SOURCE_CHARS: usize = 4000;
}

/// Network constants
pub mod network {
    /// Default timeout for model requests (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
}
