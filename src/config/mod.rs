//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/sysforge/config.toml)
//! 3. Project config (.sysforge/config.toml)
//! 4. Environment variables (SYSFORGE_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
