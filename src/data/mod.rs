//! Sharded, cyclic batch loaders over ingested annotation records.

mod batch;
mod loader;
mod shard;

pub use batch::{Batch, Example};
pub use loader::DataLoader;
pub use shard::shard_range;
