use std::sync::Arc;

use log::{error, info};
use tokio::task::JoinSet;

use super::WorkerLoop;
use crate::{
    annotation::{AnnotationRecord, DatasetSplit, ImageProbe, load_split},
    augmentation::{AugmentationPolicy, Augmenter},
    checkpoint::CheckpointStore,
    config::{ConfigErr, RunPlan, TrainingConfig},
    data::DataLoader,
    error::{Result, SegErr},
    hooks::{DEFAULT_ORDER, Stage, StagePipeline},
    metrics::{MetricHistoryStore, MetricSink, PeriodicWriter},
    model::ModelRunner,
    sync::{BarrierReducer, Reducer, SoloReducer, WorkerRank},
    validation::ValidationMonitor,
};

/// Builds the model replica of one worker.
pub type ModelFactory<'a> = dyn Fn(WorkerRank) -> Result<Box<dyn ModelRunner>> + 'a;

/// Offsets separating the random streams of a worker.
const TRAIN_STREAM: u64 = 0;
const AUGMENT_STREAM: u64 = 1;
const VALIDATION_STREAM: u64 = 2;

/// A training run over already ingested splits, executed by `world_size` in-process workers.
pub struct Session {
    config: TrainingConfig,
    plan: RunPlan,
    train: Arc<[AnnotationRecord]>,
    validation: Arc<[AnnotationRecord]>,
}

impl Session {
    /// Creates a new `Session`.
    ///
    /// # Arguments
    /// * `config` - The validated run configuration.
    /// * `train` - The ingested training split.
    /// * `validation` - The ingested validation split.
    ///
    /// # Returns
    /// A configuration error if the run would have zero iterations.
    pub fn new(
        config: TrainingConfig,
        train: Vec<AnnotationRecord>,
        validation: Vec<AnnotationRecord>,
    ) -> Result<Self> {
        let plan = RunPlan::new(&config, train.len())?;
        Ok(Self {
            config,
            plan,
            train: train.into(),
            validation: validation.into(),
        })
    }

    /// Ingests the training and validation splits below the configured dataset root.
    pub fn prepare<P: ImageProbe>(config: TrainingConfig, probe: &P) -> Result<Self> {
        let root = config.dataset_root().clone();
        let train = load_split(&root, DatasetSplit::Train, config.categories(), probe)?;
        let validation = load_split(&root, DatasetSplit::Validate, config.categories(), probe)?;
        Self::new(config, train, validation)
    }

    #[inline]
    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    #[inline]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Runs every worker to completion.
    ///
    /// # Arguments
    /// * `factory` - Called once per worker, in rank order, before any worker starts.
    /// * `checkpoints` - Where the leader saves the best model state.
    /// * `sinks` - Where the leader's metrics writer flushes.
    ///
    /// # Returns
    /// The leader's metric history, or the first worker failure.
    pub async fn run(
        &self,
        factory: &ModelFactory<'_>,
        checkpoints: Arc<dyn CheckpointStore>,
        sinks: Vec<Box<dyn MetricSink>>,
    ) -> Result<MetricHistoryStore> {
        let world_size = self.config.world_size();
        info!(
            world_size = world_size.get(),
            max_iter = self.plan.max_iter.get(),
            train = self.train.len(),
            validation = self.validation.len();
            "starting training session"
        );

        let storage = if world_size.get() == 1 {
            self.run_with(Arc::new(SoloReducer), factory, checkpoints, sinks)
                .await?
        } else {
            let reducer = Arc::new(BarrierReducer::new(world_size));
            self.run_with(reducer, factory, checkpoints, sinks).await?
        };

        info!("training session finished");
        Ok(storage)
    }

    async fn run_with<R>(
        &self,
        reducer: Arc<R>,
        factory: &ModelFactory<'_>,
        checkpoints: Arc<dyn CheckpointStore>,
        sinks: Vec<Box<dyn MetricSink>>,
    ) -> Result<MetricHistoryStore>
    where
        R: Reducer + Sync + 'static,
    {
        let world_size = self.config.world_size();
        let mut sinks = Some(sinks);

        let mut workers = Vec::with_capacity(world_size.get());
        for rank in 0..world_size.get() {
            let rank = WorkerRank::new(rank, world_size)?;
            let leader_sinks = if rank.is_leader() {
                sinks.take().unwrap_or_default()
            } else {
                Vec::new()
            };
            workers.push(self.worker(rank, factory, &reducer, &checkpoints, leader_sinks)?);
        }

        let mut tasks = JoinSet::new();
        for worker in workers {
            tasks.spawn(worker.run());
        }

        let mut leader_storage = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(SegErr::WorkerFailed(e.to_string())),
            };

            match outcome {
                Ok(Some(storage)) => leader_storage = Some(storage),
                Ok(None) => {}
                Err(e) => {
                    error!("worker failed, aborting the session: {e}");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        leader_storage
            .ok_or_else(|| SegErr::WorkerFailed("the leader returned no metric history".into()))
    }

    fn worker<R>(
        &self,
        rank: WorkerRank,
        factory: &ModelFactory<'_>,
        reducer: &Arc<R>,
        checkpoints: &Arc<dyn CheckpointStore>,
        sinks: Vec<Box<dyn MetricSink>>,
    ) -> Result<WorkerLoop<R>>
    where
        R: Reducer + Sync + 'static,
    {
        let batch_size = self.config.batch_size();
        let seed = self.config.seed();

        let train = DataLoader::new(
            self.train.clone(),
            rank,
            batch_size,
            Augmenter::new(
                self.config.augmentation(),
                worker_seed(seed, rank, AUGMENT_STREAM),
            ),
            Some(worker_seed(seed, rank, TRAIN_STREAM)),
        )?;
        let validation = DataLoader::new(
            self.validation.clone(),
            rank,
            batch_size,
            Augmenter::new(AugmentationPolicy::Minimal, seed),
            Some(worker_seed(seed, rank, VALIDATION_STREAM)),
        )?;

        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(PeriodicWriter::new(self.config.writer_period(), sinks)),
            Box::new(ValidationMonitor::new(
                validation,
                reducer.clone(),
                checkpoints.clone(),
            )),
        ];

        let pipeline = StagePipeline::new(stages)?;
        if pipeline.names() != DEFAULT_ORDER {
            return Err(ConfigErr::invalid(
                "stages",
                format!("expected order {DEFAULT_ORDER:?}, got {:?}", pipeline.names()),
            )
            .into());
        }

        Ok(WorkerLoop::new(
            rank,
            self.plan.max_iter,
            train,
            factory(rank)?,
            reducer.clone(),
            pipeline,
        ))
    }
}

fn worker_seed(base: u64, rank: WorkerRank, stream: u64) -> u64 {
    base.wrapping_add(rank.rank() as u64)
        .wrapping_add(stream << 32)
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, path::PathBuf};

    use super::*;
    use crate::{
        checkpoint::MemoryCheckpointStore,
        data::Batch,
        model::{LossMap, ModelErr},
    };

    struct Idle;

    impl ModelRunner for Idle {
        fn train_step(
            &mut self,
            _step: usize,
            _batch: &Batch<'_>,
        ) -> std::result::Result<LossMap, ModelErr> {
            Ok(LossMap::new())
        }

        fn eval_losses(&mut self, _batch: &Batch<'_>) -> std::result::Result<LossMap, ModelErr> {
            Ok(LossMap::new())
        }

        fn state(&self) -> std::result::Result<Vec<u8>, ModelErr> {
            Ok(vec![])
        }
    }

    #[test]
    fn worker_streams_do_not_collide() {
        let two = NonZeroUsize::new(2).unwrap();
        let a = WorkerRank::new(0, two).unwrap();
        let b = WorkerRank::new(1, two).unwrap();

        let seeds = [
            worker_seed(1, a, TRAIN_STREAM),
            worker_seed(1, b, TRAIN_STREAM),
            worker_seed(1, a, AUGMENT_STREAM),
            worker_seed(1, b, VALIDATION_STREAM),
        ];
        for (i, x) in seeds.iter().enumerate() {
            assert!(seeds[i + 1..].iter().all(|y| x != y));
        }
    }

    #[test]
    fn workers_flush_metrics_before_validating() {
        let records: Vec<AnnotationRecord> = (0..2)
            .map(|image_id| AnnotationRecord {
                file_name: PathBuf::from(format!("{image_id}.png")),
                image_id,
                height: 1,
                width: 1,
                annotations: vec![],
            })
            .collect();
        let session =
            Session::new(TrainingConfig::default(), records.clone(), records).unwrap();
        let factory = |_: WorkerRank| -> Result<Box<dyn ModelRunner>> { Ok(Box::new(Idle)) };
        let checkpoints: Arc<dyn CheckpointStore> = Arc::new(MemoryCheckpointStore::new());

        let worker = session
            .worker(
                WorkerRank::leader_of(NonZeroUsize::MIN),
                &factory,
                &Arc::new(SoloReducer),
                &checkpoints,
                vec![],
            )
            .unwrap();

        assert_eq!(worker.stage_names(), DEFAULT_ORDER.to_vec());
        assert_eq!(
            DEFAULT_ORDER,
            [PeriodicWriter::NAME, ValidationMonitor::<SoloReducer>::NAME]
        );
    }

    #[test]
    fn too_few_training_images_is_a_configuration_error() {
        let record = AnnotationRecord {
            file_name: PathBuf::from("a.png"),
            image_id: 0,
            height: 1,
            width: 1,
            annotations: vec![],
        };
        let result = Session::new(TrainingConfig::default(), vec![], vec![record]);
        assert!(matches!(result, Err(SegErr::Config(_))));
    }
}
