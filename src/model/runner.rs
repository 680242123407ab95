use super::{LossMap, ModelErr};
use crate::data::Batch;

/// A trainable instance segmentation model.
///
/// Every worker owns its own runner. Implementations are free to synchronize their
/// parameters however they like; the training loop only consumes the losses.
pub trait ModelRunner: Send {
    /// Runs one optimization step on `batch` and returns the named loss components.
    ///
    /// # Arguments
    /// * `step` - The zero-based global step index.
    /// * `batch` - The augmented examples of this step.
    fn train_step(&mut self, step: usize, batch: &Batch<'_>) -> Result<LossMap, ModelErr>;

    /// Computes the named loss components of `batch` in training mode, without
    /// updating any parameter.
    fn eval_losses(&mut self, batch: &Batch<'_>) -> Result<LossMap, ModelErr>;

    /// Serializes the current parameters.
    fn state(&self) -> Result<Vec<u8>, ModelErr>;
}
