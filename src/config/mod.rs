//! Immutable run configuration.
//!
//! A `TrainingDraft` mirrors the JSON document field by field; `TrainingConfig` is the
//! validated, read-only result every other module consumes.

mod draft;
mod error;
mod plan;
mod training;

pub use draft::{DEFAULT_BACKBONE, DEFAULT_CATEGORIES, TrainingDraft};
pub use error::{ConfigErr, Result};
pub use plan::{Device, RunPlan, max_iterations};
pub use training::TrainingConfig;
