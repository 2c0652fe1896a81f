use derive_more::{Display, Error};

/// Malformed work items, rejected before they reach any worker.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Display, Error)]
pub enum BatchError {
    #[display("sequence of length {len} in work item {index} exceeds the maximum read length {max}")]
    Overlength { index: usize, len: usize, max: usize },
    #[display("work item index {index} is already in the batch")]
    DuplicateIndex { index: usize },
}
