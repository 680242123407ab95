//! Post-step stages run by every worker, in an explicit order.

mod pipeline;
mod stage;

pub use pipeline::{DEFAULT_ORDER, StagePipeline};
pub use stage::{Stage, StepContext};
