use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;
use eyre::Result;

use pimwave_alignment_rs::pairwise::{EditScript, Status};

/// Outcome of a single work item.
///
/// Edit-script bytes of the item occupy `[begin, end)` of its slot in [`Results`]; both are zero
/// when no script was produced.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Getters, Dissolve)]
pub struct Record {
    index: usize,
    score: usize,
    status: Status,
    begin: usize,
    end: usize,
    max_operations: usize,
}

/// Records in input order plus the edit-script bytes, one slot of `stride` bytes per record.
#[derive(Clone, Eq, PartialEq, Debug, Getters, Dissolve)]
pub struct Results {
    records: Vec<Record>,
    #[getter(skip)]
    operations: Vec<u8>,
    stride: usize,
}

impl Results {
    pub(crate) fn new(records: Vec<Record>, operations: Vec<u8>, stride: usize) -> Self {
        debug_assert!(operations.is_empty() || operations.len() == records.len() * stride);
        Self {
            records,
            operations,
            stride,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw edit-script bytes of the i-th record (`M`, `X`, `I`, `D`).
    pub fn operations(&self, item: usize) -> &[u8] {
        if self.operations.is_empty() {
            return &[];
        }
        let record = &self.records[item];
        let slot = item * self.stride;
        &self.operations[slot + record.begin..slot + record.end]
    }

    pub fn script(&self, item: usize) -> Result<EditScript> {
        EditScript::from_bytes(self.operations(item))
    }

    pub fn rle(&self, item: usize) -> Result<String> {
        Ok(self.script(item)?.rle())
    }

    /// Number of work items that hit the score bound.
    pub fn abandoned(&self) -> usize {
        self.records
            .iter()
            .filter(|x| x.status == Status::Exhausted)
            .count()
    }
}
