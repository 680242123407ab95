use async_trait::async_trait;

use crate::{error::Result, metrics::MetricHistoryStore, model::ModelRunner, sync::WorkerRank};

/// What a stage sees after a training step.
pub struct StepContext<'a> {
    /// Zero-based index of the step that just completed.
    pub step: usize,
    pub rank: WorkerRank,
    pub model: &'a mut dyn ModelRunner,
    /// The metric history, present on the leader worker only.
    pub storage: Option<&'a mut MetricHistoryStore>,
}

/// A unit of work executed after every training step.
#[async_trait]
pub trait Stage: Send {
    /// Stable name used to document and check the pipeline order.
    fn name(&self) -> &'static str;

    /// Runs after each completed training step.
    async fn after_step(&mut self, ctx: &mut StepContext<'_>) -> Result<()>;

    /// Runs once after the last step.
    async fn after_train(&mut self, _ctx: &mut StepContext<'_>) -> Result<()> {
        Ok(())
    }
}
