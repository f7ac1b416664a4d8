//! Step records and the pool that recycles them across group loads.

mod pool;
mod record;

pub use pool::StepPool;
pub use record::{HighlightScope, StepConfig, StepKind, StepRecord};
