pub mod calculations;
pub mod engine;
pub mod models;
pub mod money;

pub use engine::{RecomputeOutcome, recompute};
pub use models::*;
