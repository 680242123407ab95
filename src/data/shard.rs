use std::ops::Range;

/// Splits `total` items among `num_workers` and returns the slice of `worker_id`.
///
/// Ranges are contiguous, disjoint and cover `0..total`; their sizes differ by at most 1.
pub fn shard_range(total: usize, worker_id: usize, num_workers: usize) -> Range<usize> {
    let base = total / num_workers;
    let rem = total % num_workers;

    let start = worker_id * base + worker_id.min(rem);
    let extra = usize::from(worker_id < rem);
    start..start + base + extra
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shards_are_balanced_and_cover_everything() {
        assert_eq!(shard_range(10, 0, 3), 0..4);
        assert_eq!(shard_range(10, 1, 3), 4..7);
        assert_eq!(shard_range(10, 2, 3), 7..10);
    }

    #[test]
    fn more_workers_than_items_leaves_empty_shards() {
        assert_eq!(shard_range(2, 0, 3), 0..1);
        assert_eq!(shard_range(2, 1, 3), 1..2);
        assert!(shard_range(2, 2, 3).is_empty());
    }
}
