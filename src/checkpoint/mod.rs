//! Named, opaque model-state persistence.

mod dir;
mod error;
mod memory;
mod store;

pub use dir::{CHECKPOINT_EXT, DirCheckpointStore};
pub use error::{CheckpointErr, Result};
pub use memory::MemoryCheckpointStore;
pub use store::CheckpointStore;
