pub mod config;
pub mod export;
pub mod generate;
pub mod plan;
pub mod refine;
pub mod run;
pub mod status;
