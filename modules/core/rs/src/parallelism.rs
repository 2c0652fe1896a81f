use std::cmp::Ordering;
use std::ops::Range;
use std::thread::available_parallelism;

use eyre::Result;

fn _normalize(requested: isize, max: isize) -> usize {
    match requested.cmp(&0) {
        Ordering::Less => (max + requested + 1).max(1) as usize,
        Ordering::Equal => 1,
        Ordering::Greater => requested.min(max) as usize,
    }
}

/// Number of workers to use. Negative values count back from the number of available cores,
/// e.g. -1 means "all cores", -2 means "all but one".
pub fn available(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get() as isize;
    Ok(_normalize(requested, max))
}

/// Splits `items` into at most `workers` disjoint, contiguous shards of near-equal size.
/// Every item belongs to exactly one shard and shards come out in input order.
pub fn shards(items: usize, workers: usize) -> Vec<Range<usize>> {
    if items == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, items);
    let per_worker = items.div_ceil(workers);

    (0..items)
        .step_by(per_worker)
        .map(|start| start..(start + per_worker).min(items))
        .collect()
}
