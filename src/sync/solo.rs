use super::{ReduceErr, Reducer, Result, WorkerRank};
use crate::model::LossMap;

/// The reducer of a single-worker run: the reduction is the identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoloReducer;

impl Reducer for SoloReducer {
    async fn all_reduce(&self, rank: WorkerRank, components: &LossMap) -> Result<LossMap> {
        if rank.world_size().get() != 1 {
            return Err(ReduceErr::WorldSizeMismatch {
                expected: 1,
                got: rank.world_size().get(),
            });
        }

        Ok(components.clone())
    }
}
