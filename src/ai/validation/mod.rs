//! Model Output Cleanup and Structured Decoding
//!
//! Two pieces every stage shares:
//! - [`strip_code_fence`] removes the markdown wrapper models put around code
//! - [`parse_object`] / [`parse_or_fallback`] decode a JSON object strictly,
//!   tagging the result instead of raising when the answer isn't usable
//!
//! There is no repair step. A stage that gets malformed JSON falls back to
//! its placeholder and keeps the raw text for audit.

mod fence;
mod structured;

pub use fence::strip_code_fence;
pub use structured::{parse_object, parse_or_fallback};
