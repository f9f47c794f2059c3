pub mod database;
pub mod export;
pub mod store;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use export::{export_files, safe_path};
pub use store::{IterationRecord, ProjectRecord, ProjectStore, SharedStore};
