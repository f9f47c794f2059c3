pub mod error;
pub mod fileset;
pub mod plan;
pub mod review;
pub mod spec;
pub mod stage;
pub mod utils;

pub use error::{
    ErrorCategory, ErrorClass, ForgeError, Result, ResultExt, UpstreamError,
};
pub use fileset::FileSet;
pub use plan::{FALLBACK_ARCHITECTURE, ImplementationPlan};
pub use review::{
    EXCELLENT_SCORE, RefactorOutcome, RefactorStatus, ReviewFallbackPolicy, ReviewVerdict,
};
pub use spec::{DEFAULT_CONSTRAINTS, GenerationRequest, RefinedSpecification};
pub use stage::StageOutput;
pub use utils::{truncate_chars, value_to_text};
