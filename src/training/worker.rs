use std::{num::NonZeroUsize, sync::Arc};

use log::{debug, info};

use crate::{
    data::DataLoader,
    error::Result,
    hooks::{StagePipeline, StepContext},
    metrics::MetricHistoryStore,
    model::{self, LossPhase, ModelErr, ModelRunner},
    sync::{Reducer, WorkerRank},
};

/// Metric holding the reduced training total.
pub const TOTAL_LOSS: &str = "total_loss";

/// Drives one worker through a fixed number of steps.
///
/// Each step trains on one batch, reduces the loss components across workers, records
/// them on the leader and then runs the post-step stages in order.
pub struct WorkerLoop<R> {
    rank: WorkerRank,
    max_iter: NonZeroUsize,
    loader: DataLoader,
    model: Box<dyn ModelRunner>,
    reducer: Arc<R>,
    stages: StagePipeline,
    storage: Option<MetricHistoryStore>,
}

impl<R: Reducer + Sync> WorkerLoop<R> {
    /// Creates a new `WorkerLoop`.
    ///
    /// The leader gets a fresh metric store; every other worker runs without one.
    ///
    /// # Arguments
    /// * `rank` - This worker's position in the group.
    /// * `max_iter` - The amount of steps to run.
    /// * `loader` - This worker's training loader.
    /// * `model` - This worker's model replica.
    /// * `reducer` - Shared with every other worker of the run.
    /// * `stages` - Run after every step, in order.
    pub fn new(
        rank: WorkerRank,
        max_iter: NonZeroUsize,
        loader: DataLoader,
        model: Box<dyn ModelRunner>,
        reducer: Arc<R>,
        stages: StagePipeline,
    ) -> Self {
        Self {
            storage: rank.is_leader().then(MetricHistoryStore::new),
            rank,
            max_iter,
            loader,
            model,
            reducer,
            stages,
        }
    }

    /// Names of the post-step stages, in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.names()
    }

    /// Runs every step, then the stages' end-of-training work.
    ///
    /// # Returns
    /// The metric history on the leader, `None` on every other worker.
    pub async fn run(mut self) -> Result<Option<MetricHistoryStore>> {
        info!(rank = self.rank.rank(), max_iter = self.max_iter.get(); "worker starting");

        for step in 0..self.max_iter.get() {
            let losses = {
                let batch = self.loader.next_batch();
                self.model.train_step(step, &batch)?
            };
            if losses.contains_key(TOTAL_LOSS) {
                return Err(
                    ModelErr::new(format!("step {step}: component named {TOTAL_LOSS}")).into(),
                );
            }
            model::ensure_finite(step, LossPhase::Training, &losses)?;

            let reduced = self.reducer.all_reduce(self.rank, &losses).await?;
            let total = model::ensure_finite(step, LossPhase::Training, &reduced)?;

            if let Some(storage) = self.storage.as_mut() {
                storage.append(TOTAL_LOSS, total, step)?;
                for (name, value) in &reduced {
                    storage.append(name, *value, step)?;
                }
            }
            debug!(rank = self.rank.rank(), step = step, total_loss = total; "step done");

            let mut ctx = StepContext {
                step,
                rank: self.rank,
                model: self.model.as_mut(),
                storage: self.storage.as_mut(),
            };
            self.stages.after_step(&mut ctx).await?;
        }

        let mut ctx = StepContext {
            step: self.max_iter.get() - 1,
            rank: self.rank,
            model: self.model.as_mut(),
            storage: self.storage.as_mut(),
        };
        self.stages.after_train(&mut ctx).await?;

        info!(rank = self.rank.rank(); "worker finished");
        Ok(self.storage)
    }
}
