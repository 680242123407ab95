//! The seam between the training loop and whatever model implementation runs the math.

mod error;
mod loss;
mod runner;

pub use error::ModelErr;
pub use loss::{LossMap, LossPhase, ensure_finite, total};
pub use runner::ModelRunner;
