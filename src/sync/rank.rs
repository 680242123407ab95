use std::{num::NonZeroUsize, ops::Range};

use super::{ReduceErr, Result};
use crate::data::shard_range;

/// A worker's position among `world_size` cooperating workers.
///
/// Rank 0 is the leader: the only worker that records metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerRank {
    rank: usize,
    world_size: NonZeroUsize,
}

impl WorkerRank {
    /// Creates a new `WorkerRank`.
    ///
    /// # Returns
    /// `ReduceErr::RankOutOfRange` if `rank >= world_size`.
    pub fn new(rank: usize, world_size: NonZeroUsize) -> Result<Self> {
        if rank >= world_size.get() {
            return Err(ReduceErr::RankOutOfRange {
                rank,
                world_size: world_size.get(),
            });
        }

        Ok(Self { rank, world_size })
    }

    /// The leader of a group of `world_size` workers.
    pub fn leader_of(world_size: NonZeroUsize) -> Self {
        Self {
            rank: 0,
            world_size,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn world_size(&self) -> NonZeroUsize {
        self.world_size
    }

    pub fn is_leader(&self) -> bool {
        self.rank == 0
    }

    /// The contiguous slice of `total` items this worker owns.
    pub fn shard_range(&self, total: usize) -> Range<usize> {
        shard_range(total, self.rank, self.world_size.get())
    }
}
