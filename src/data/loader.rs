use std::{num::NonZeroUsize, ops::Range, sync::Arc};

use log::trace;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{Batch, Example};
use crate::{
    annotation::AnnotationRecord,
    augmentation::Augmenter,
    config::{ConfigErr, Result},
    sync::WorkerRank,
};

/// Shard-aware, never-ending loader producing batches that borrow the shared records.
///
/// Batches are always full: when the shard is exhausted mid-batch the loader restarts
/// from the shard beginning and keeps filling. With shuffling on, every pass visits the
/// shard in a fresh seeded order.
#[derive(Debug)]
pub struct DataLoader {
    records: Arc<[AnnotationRecord]>,
    shard: Range<usize>,
    batch_size: NonZeroUsize,
    augmenter: Augmenter,
    shuffle: Option<StdRng>,
    order: Vec<usize>,
    cursor: usize,
    passes: usize,
}

impl DataLoader {
    /// Creates a new `DataLoader`.
    ///
    /// # Arguments
    /// * `records` - The whole split, shared between workers.
    /// * `rank` - Selects the contiguous shard this loader visits.
    /// * `batch_size` - Examples per batch.
    /// * `augmenter` - Draws the augmentation parameters of every visited example.
    /// * `shuffle_seed` - Seed of the per-pass shuffle, or `None` to visit in record order.
    ///
    /// # Returns
    /// `ConfigErr::EmptyShard` if this worker's shard holds no record.
    pub fn new(
        records: Arc<[AnnotationRecord]>,
        rank: WorkerRank,
        batch_size: NonZeroUsize,
        augmenter: Augmenter,
        shuffle_seed: Option<u64>,
    ) -> Result<Self> {
        let shard = rank.shard_range(records.len());
        if shard.is_empty() {
            return Err(ConfigErr::EmptyShard {
                rank: rank.rank(),
                world_size: rank.world_size().get(),
                total: records.len(),
            });
        }

        let mut loader = Self {
            records,
            order: shard.clone().collect(),
            shard,
            batch_size,
            augmenter,
            shuffle: shuffle_seed.map(StdRng::seed_from_u64),
            cursor: 0,
            passes: 0,
        };
        loader.shuffle_order();
        Ok(loader)
    }

    #[inline]
    pub fn shard_range(&self) -> Range<usize> {
        self.shard.clone()
    }

    /// Completed passes over the shard.
    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Returns the next full batch, wrapping around the shard as needed.
    pub fn next_batch(&mut self) -> Batch<'_> {
        let mut picks = Vec::with_capacity(self.batch_size.get());
        for _ in 0..self.batch_size.get() {
            if self.cursor == self.order.len() {
                self.restart();
            }
            picks.push((self.order[self.cursor], self.augmenter.draw()));
            self.cursor += 1;
        }

        let examples = picks
            .into_iter()
            .map(|(idx, transforms)| Example {
                record: &self.records[idx],
                transforms,
            })
            .collect();

        Batch { examples }
    }

    fn restart(&mut self) {
        self.passes += 1;
        self.cursor = 0;
        self.shuffle_order();
        trace!(passes = self.passes; "data loader restarted");
    }

    fn shuffle_order(&mut self) {
        if let Some(rng) = self.shuffle.as_mut() {
            self.order.shuffle(rng);
        }
    }
}
