use std::{mem, num::NonZeroUsize};

use log::trace;
use parking_lot::Mutex;
use tokio::sync::Barrier;

use super::{ReduceErr, Reducer, Result, WorkerRank};
use crate::model::LossMap;

/// Averages loss components across in-process workers using a barrier.
///
/// Each round, every worker deposits its components and waits. The worker the barrier
/// elects as leader computes the mean in rank order, so every worker gets the same bits
/// back regardless of arrival order. A second wait publishes the outcome.
pub struct BarrierReducer {
    world_size: NonZeroUsize,
    barrier: Barrier,
    round: Mutex<Round>,
}

struct Round {
    contributions: Vec<(usize, LossMap)>,
    outcome: Result<LossMap>,
}

impl BarrierReducer {
    /// Creates a new `BarrierReducer`.
    ///
    /// # Arguments
    /// * `world_size` - The amount of workers taking part in every round.
    pub fn new(world_size: NonZeroUsize) -> Self {
        Self {
            world_size,
            barrier: Barrier::new(world_size.get()),
            round: Mutex::new(Round {
                contributions: Vec::with_capacity(world_size.get()),
                outcome: Ok(LossMap::new()),
            }),
        }
    }
}

impl Reducer for BarrierReducer {
    async fn all_reduce(&self, rank: WorkerRank, components: &LossMap) -> Result<LossMap> {
        if rank.world_size() != self.world_size {
            return Err(ReduceErr::WorldSizeMismatch {
                expected: self.world_size.get(),
                got: rank.world_size().get(),
            });
        }

        self.round
            .lock()
            .contributions
            .push((rank.rank(), components.clone()));

        if self.barrier.wait().await.is_leader() {
            let mut round = self.round.lock();
            let contributions = mem::take(&mut round.contributions);
            round.outcome = mean_in_rank_order(contributions);
            trace!(rank = rank.rank(); "reduced loss components");
        }

        self.barrier.wait().await;
        self.round.lock().outcome.clone()
    }
}

fn mean_in_rank_order(mut contributions: Vec<(usize, LossMap)>) -> Result<LossMap> {
    contributions.sort_by_key(|(rank, _)| *rank);

    let Some((_, first)) = contributions.first() else {
        return Ok(LossMap::new());
    };
    let expected: Vec<String> = first.keys().cloned().collect();

    for (rank, components) in &contributions {
        if !components.keys().eq(expected.iter()) {
            return Err(ReduceErr::ComponentMismatch {
                rank: *rank,
                expected,
                got: components.keys().cloned().collect(),
            });
        }
    }

    let count = contributions.len() as f64;
    let reduced = expected
        .iter()
        .map(|name| {
            let sum: f64 = contributions
                .iter()
                .map(|(_, components)| components[name])
                .sum();
            (name.clone(), sum / count)
        })
        .collect();

    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::task::JoinSet;

    use super::*;

    fn losses(values: &[(&str, f64)]) -> LossMap {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    async fn reduce_all(inputs: Vec<LossMap>) -> Vec<(usize, Result<LossMap>)> {
        let world_size = NonZeroUsize::new(inputs.len()).unwrap();
        let reducer = Arc::new(BarrierReducer::new(world_size));

        let mut tasks = JoinSet::new();
        for (rank, input) in inputs.into_iter().enumerate() {
            let reducer = reducer.clone();
            tasks.spawn(async move {
                let rank = WorkerRank::new(rank, world_size).unwrap();
                (rank.rank(), reducer.all_reduce(rank, &input).await)
            });
        }

        let mut results = tasks.join_all().await;
        results.sort_by_key(|(rank, _)| *rank);
        results
    }

    #[tokio::test]
    async fn every_worker_gets_the_same_mean() {
        let results = reduce_all(vec![
            losses(&[("loss_cls", 1.0), ("loss_mask", 0.5)]),
            losses(&[("loss_cls", 3.0), ("loss_mask", 1.5)]),
        ])
        .await;

        let expected = losses(&[("loss_cls", 2.0), ("loss_mask", 1.0)]);
        for (_, result) in results {
            assert_eq!(result.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn rounds_can_be_repeated() {
        let world_size = NonZeroUsize::new(3).unwrap();
        let reducer = Arc::new(BarrierReducer::new(world_size));

        let mut tasks = JoinSet::new();
        for rank in 0..3 {
            let reducer = reducer.clone();
            tasks.spawn(async move {
                let rank = WorkerRank::new(rank, world_size).unwrap();
                let mut seen = Vec::new();
                for round in 0..5 {
                    let value = (round * 3 + rank.rank()) as f64;
                    let reduced = reducer
                        .all_reduce(rank, &losses(&[("loss", value)]))
                        .await
                        .unwrap();
                    seen.push(reduced["loss"]);
                }
                seen
            });
        }

        for seen in tasks.join_all().await {
            assert_eq!(seen, vec![1.0, 4.0, 7.0, 10.0, 13.0]);
        }
    }

    #[tokio::test]
    async fn mismatched_components_fail_on_every_worker() {
        let results = reduce_all(vec![
            losses(&[("loss_cls", 1.0)]),
            losses(&[("loss_box_reg", 1.0)]),
        ])
        .await;

        for (_, result) in results {
            assert!(matches!(
                result,
                Err(ReduceErr::ComponentMismatch { rank: 1, .. })
            ));
        }
    }
}
