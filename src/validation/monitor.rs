use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use crate::{
    checkpoint::CheckpointStore,
    data::DataLoader,
    error::Result,
    hooks::{Stage, StepContext},
    model::{self, LossMap, LossPhase},
    sync::Reducer,
};

/// Prefix that sets validation components apart from training ones.
pub const VAL_PREFIX: &str = "val_";

/// Metric holding the reduced validation total.
pub const TOTAL_VAL_LOSS: &str = "total_val_loss";

/// Name the best checkpoint is saved under; each new minimum replaces it.
pub const BEST_CHECKPOINT: &str = "model_best";

/// Scores one validation batch after every training step and keeps the best checkpoint.
///
/// Every worker samples and reduces; only the leader, the worker holding the metric
/// store, records the reduced losses and writes checkpoints.
pub struct ValidationMonitor<R> {
    loader: DataLoader,
    reducer: Arc<R>,
    checkpoints: Arc<dyn CheckpointStore>,
}

impl<R: Reducer> ValidationMonitor<R> {
    pub const NAME: &'static str = "validation_monitor";

    /// Creates a new `ValidationMonitor`.
    ///
    /// # Arguments
    /// * `loader` - This worker's persistent, cyclic validation loader.
    /// * `reducer` - Shared with every other worker of the run.
    /// * `checkpoints` - Where the leader saves the best model state.
    pub fn new(
        loader: DataLoader,
        reducer: Arc<R>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            loader,
            reducer,
            checkpoints,
        }
    }
}

#[async_trait]
impl<R: Reducer + Sync + 'static> Stage for ValidationMonitor<R> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn after_step(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        let step = ctx.step;

        let losses = {
            let batch = self.loader.next_batch();
            ctx.model.eval_losses(&batch)?
        };
        model::ensure_finite(step, LossPhase::Validation, &losses)?;

        let reduced = self.reducer.all_reduce(ctx.rank, &losses).await?;
        let prefixed: LossMap = reduced
            .into_iter()
            .map(|(name, value)| (format!("{VAL_PREFIX}{name}"), value))
            .collect();
        let total = model::ensure_finite(step, LossPhase::Validation, &prefixed)?;

        let Some(storage) = ctx.storage.as_deref_mut() else {
            return Ok(());
        };

        storage.append(TOTAL_VAL_LOSS, total, step)?;
        for (name, value) in &prefixed {
            storage.append(name, *value, step)?;
        }
        debug!(step = step, total_val_loss = total; "validation loss recorded");

        if storage.is_new_minimum(TOTAL_VAL_LOSS) {
            let state = ctx.model.state()?;
            self.checkpoints.save(BEST_CHECKPOINT, &state)?;
            info!(step = step, total_val_loss = total; "saved new best checkpoint");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, num::NonZeroUsize, path::PathBuf};

    use super::*;
    use crate::{
        annotation::AnnotationRecord,
        augmentation::{AugmentationPolicy, Augmenter},
        checkpoint::MemoryCheckpointStore,
        data::Batch,
        error::SegErr,
        metrics::MetricHistoryStore,
        model::{ModelErr, ModelRunner},
        sync::{SoloReducer, WorkerRank},
    };

    struct Scripted {
        evals: VecDeque<f64>,
        evaluated: usize,
    }

    impl Scripted {
        fn new(totals: &[f64]) -> Self {
            Self {
                evals: totals.iter().copied().collect(),
                evaluated: 0,
            }
        }
    }

    impl ModelRunner for Scripted {
        fn train_step(
            &mut self,
            _step: usize,
            _batch: &Batch<'_>,
        ) -> std::result::Result<LossMap, ModelErr> {
            Ok(LossMap::new())
        }

        fn eval_losses(&mut self, batch: &Batch<'_>) -> std::result::Result<LossMap, ModelErr> {
            assert_eq!(batch.len(), 1);
            let total = self
                .evals
                .pop_front()
                .ok_or_else(|| ModelErr::new("script exhausted"))?;
            self.evaluated += 1;

            Ok([
                ("loss_cls".to_string(), total / 2.0),
                ("loss_mask".to_string(), total / 2.0),
            ]
            .into_iter()
            .collect())
        }

        fn state(&self) -> std::result::Result<Vec<u8>, ModelErr> {
            Ok(self.evaluated.to_string().into_bytes())
        }
    }

    fn monitor(store: &Arc<MemoryCheckpointStore>) -> ValidationMonitor<SoloReducer> {
        let records: Arc<[AnnotationRecord]> = vec![AnnotationRecord {
            file_name: PathBuf::from("val.png"),
            image_id: 0,
            height: 8,
            width: 8,
            annotations: vec![],
        }]
        .into();
        let loader = DataLoader::new(
            records,
            WorkerRank::leader_of(NonZeroUsize::MIN),
            NonZeroUsize::MIN,
            Augmenter::new(AugmentationPolicy::Minimal, 0),
            None,
        )
        .unwrap();

        ValidationMonitor::new(loader, Arc::new(SoloReducer), store.clone())
    }

    async fn run_steps(
        monitor: &mut ValidationMonitor<SoloReducer>,
        model: &mut Scripted,
        storage: &mut MetricHistoryStore,
        steps: usize,
    ) -> Result<()> {
        for step in 0..steps {
            let mut ctx = StepContext {
                step,
                rank: WorkerRank::leader_of(NonZeroUsize::MIN),
                model: &mut *model,
                storage: Some(&mut *storage),
            };
            monitor.after_step(&mut ctx).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn saves_only_on_strict_improvement() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut monitor = monitor(&store);
        let mut model = Scripted::new(&[10.0, 10.0, 9.0, 9.0, 11.0]);
        let mut storage = MetricHistoryStore::new();

        run_steps(&mut monitor, &mut model, &mut storage, 5)
            .await
            .unwrap();

        assert_eq!(store.saves(), vec![BEST_CHECKPOINT, BEST_CHECKPOINT]);
        assert_eq!(store.load(BEST_CHECKPOINT).unwrap(), b"3");
        assert_eq!(storage.best(TOTAL_VAL_LOSS).unwrap().step, 2);

        let totals: Vec<f64> = storage
            .values(TOTAL_VAL_LOSS)
            .unwrap()
            .iter()
            .map(|entry| entry.value)
            .collect();
        assert_eq!(totals, vec![10.0, 10.0, 9.0, 9.0, 11.0]);
        assert_eq!(
            storage.names().collect::<Vec<_>>(),
            vec![TOTAL_VAL_LOSS, "val_loss_cls", "val_loss_mask"]
        );
    }

    #[tokio::test]
    async fn non_finite_loss_never_reaches_the_store() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut monitor = monitor(&store);
        let mut model = Scripted::new(&[4.0, f64::NAN]);
        let mut storage = MetricHistoryStore::new();

        let err = run_steps(&mut monitor, &mut model, &mut storage, 2)
            .await
            .unwrap_err();

        assert!(matches!(err, SegErr::NonFiniteLoss { step: 1, .. }));
        assert_eq!(storage.values(TOTAL_VAL_LOSS).unwrap().len(), 1);
        assert_eq!(store.saves().len(), 1);
    }

    #[tokio::test]
    async fn workers_without_storage_never_checkpoint() {
        let store = Arc::new(MemoryCheckpointStore::new());
        let mut monitor = monitor(&store);
        let mut model = Scripted::new(&[3.0, 2.0]);

        for step in 0..2 {
            let mut ctx = StepContext {
                step,
                rank: WorkerRank::leader_of(NonZeroUsize::MIN),
                model: &mut model,
                storage: None,
            };
            monitor.after_step(&mut ctx).await.unwrap();
        }

        assert_eq!(model.evaluated, 2);
        assert!(store.saves().is_empty());
    }
}
