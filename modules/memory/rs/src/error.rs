use derive_more::{Display, Error};

use crate::Tier;

/// Fatal resource errors. None of them is recoverable inside a worker: budgets are planned
/// statically, so hitting one means the plan itself is wrong.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Display, Error)]
pub enum MemoryError {
    #[display(
        "out of {tier} memory: requested {requested} bytes with {used} of {capacity} bytes in use"
    )]
    Exhausted {
        tier: Tier,
        requested: usize,
        used: usize,
        capacity: usize,
    },
    #[display("transfer of {size} bytes exceeds the {limit} bytes limit")]
    OversizedTransfer { size: usize, limit: usize },
    #[display("transfer of {size} bytes is not a multiple of {alignment} bytes")]
    Misaligned { size: usize, alignment: usize },
    #[display("access to [{offset}, {offset}+{size}) is outside of the {capacity} bytes region")]
    OutOfBounds {
        offset: usize,
        size: usize,
        capacity: usize,
    },
    #[display(
        "{workers} workers x {per_worker} bytes do not fit into {available} bytes of {tier} memory"
    )]
    Overcommitted {
        tier: Tier,
        workers: usize,
        per_worker: usize,
        available: usize,
    },
}
