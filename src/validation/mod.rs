//! Step-triggered validation scoring and best-checkpoint selection.

mod monitor;

pub use monitor::{BEST_CHECKPOINT, TOTAL_VAL_LOSS, VAL_PREFIX, ValidationMonitor};
