use std::collections::HashSet;

use super::{Stage, StepContext};
use crate::{config::ConfigErr, error::Result};

/// The stage order every worker runs.
///
/// The metrics writer flushes what earlier steps recorded before the validation
/// monitor records the current step's validation losses.
pub const DEFAULT_ORDER: [&str; 2] = ["periodic_writer", "validation_monitor"];

/// An explicit, ordered list of stages.
///
/// Stages run sequentially in insertion order; the first failing stage aborts the step.
pub struct StagePipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl StagePipeline {
    /// Creates a new `StagePipeline`.
    ///
    /// # Arguments
    /// * `stages` - The stages, in execution order. Names must be unique.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for stage in &stages {
            if !seen.insert(stage.name()) {
                return Err(ConfigErr::invalid(
                    "stages",
                    format!("stage {} registered twice", stage.name()),
                )
                .into());
            }
        }

        Ok(Self { stages })
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub async fn after_step(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        for stage in &mut self.stages {
            stage.after_step(ctx).await?;
        }
        Ok(())
    }

    pub async fn after_train(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
        for stage in &mut self.stages {
            stage.after_train(ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, sync::Arc};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        data::Batch,
        error::SegErr,
        model::{LossMap, ModelErr, ModelRunner},
        sync::WorkerRank,
    };

    struct Recorder {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Stage for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn after_step(&mut self, ctx: &mut StepContext<'_>) -> Result<()> {
            self.calls.lock().push(format!("{}@{}", self.name, ctx.step));
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Stage for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn after_step(&mut self, _ctx: &mut StepContext<'_>) -> Result<()> {
            Err(SegErr::Model(ModelErr::new("boom")))
        }
    }

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

    fn recorder(name: &'static str, calls: &Arc<Mutex<Vec<String>>>) -> Box<dyn Stage> {
        Box::new(Recorder {
            name,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn stages_run_in_insertion_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = StagePipeline::new(vec![
            recorder("periodic_writer", &calls),
            recorder("validation_monitor", &calls),
        ])
        .unwrap();
        assert_eq!(pipeline.names(), DEFAULT_ORDER.to_vec());

        let mut model = Idle;
        for step in 0..2 {
            let mut ctx = StepContext {
                step,
                rank: WorkerRank::leader_of(NonZeroUsize::MIN),
                model: &mut model,
                storage: None,
            };
            pipeline.after_step(&mut ctx).await.unwrap();
        }

        assert_eq!(
            *calls.lock(),
            vec![
                "periodic_writer@0",
                "validation_monitor@0",
                "periodic_writer@1",
                "validation_monitor@1",
            ]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let result = StagePipeline::new(vec![recorder("a", &calls), recorder("a", &calls)]);
        assert!(matches!(result, Err(SegErr::Config(_))));
    }

    #[tokio::test]
    async fn failing_stage_stops_the_step() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline =
            StagePipeline::new(vec![Box::new(Failing), recorder("after", &calls)]).unwrap();

        let mut model = Idle;
        let mut ctx = StepContext {
            step: 0,
            rank: WorkerRank::leader_of(NonZeroUsize::MIN),
            model: &mut model,
            storage: None,
        };

        assert!(pipeline.after_step(&mut ctx).await.is_err());
        assert!(calls.lock().is_empty());
    }
}
