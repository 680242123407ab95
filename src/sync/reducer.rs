use super::{Result, WorkerRank};
use crate::model::LossMap;

/// Reduces every worker's loss components into one value all workers agree on.
///
/// Every worker of the group must call `all_reduce` once per round, in the same order.
#[allow(unused)]
#[trait_variant::make(Reducer: Send)]
pub trait ReducerTemplate: Sync {
    /// Contributes `components` and waits for the reduced result.
    ///
    /// # Arguments
    /// * `rank` - The calling worker.
    /// * `components` - This worker's named loss values.
    ///
    /// # Returns
    /// The component-wise mean over all workers, identical on every worker, or an error
    /// if the workers disagree on the component names.
    async fn all_reduce(&self, rank: WorkerRank, components: &LossMap) -> Result<LossMap>;
}
