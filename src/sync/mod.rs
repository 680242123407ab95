//! Cross-worker agreement on loss values.

mod barrier;
mod error;
mod rank;
mod reducer;
mod solo;

pub use barrier::BarrierReducer;
pub use error::{ReduceErr, Result};
pub use rank::WorkerRank;
pub use reducer::Reducer;
pub use solo::SoloReducer;
