use derive_getters::Getters;
use derive_more::{Constructor, Display};

use crate::{aligned, MemoryError};

/// Memory tier an arena hands out addresses from.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Display)]
pub enum Tier {
    /// Small scratch memory local to the worker
    #[display("fast")]
    Fast,
    /// Large memory reachable only through segmented transfers
    #[display("external")]
    External,
}

/// A contiguous, aligned range of addresses inside a tier.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Constructor, Getters)]
pub struct Region {
    start: usize,
    len: usize,
}

impl Region {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// Saved arena position, see [`Arena::rewind`].
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct Checkpoint {
    cursor: usize,
    used: usize,
}

/// Bump allocator over a fixed window `[base, base + capacity)` of a tier.
///
/// Memory is never freed individually. Instead the arena is rewound, either all the way back
/// with [`Arena::reset`] or to a [`Checkpoint`] taken earlier.
#[derive(Clone, Eq, PartialEq, Debug, Getters)]
pub struct Arena {
    tier: Tier,
    base: usize,
    capacity: usize,
    cursor: usize,
    used: usize,
    #[getter(skip)]
    peak: usize,
}

impl Arena {
    pub fn new(tier: Tier, base: usize, capacity: usize) -> Self {
        Self {
            tier,
            base,
            capacity,
            cursor: base,
            used: 0,
            peak: 0,
        }
    }

    /// Re-initializes the arena with a new capacity. The base address is preserved.
    pub fn init(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.reset();
        self.peak = 0;
    }

    /// Reserves `size` bytes, rounded up to the tier alignment.
    ///
    /// Zero-sized requests yield `Ok(None)`: a null handle that is not an error. Requests that
    /// do not fit fail without touching the arena state.
    pub fn alloc(&mut self, size: usize) -> Result<Option<Region>, MemoryError> {
        if size == 0 {
            return Ok(None);
        }

        let size = aligned(size);
        if self.used + size > self.capacity {
            return Err(MemoryError::Exhausted {
                tier: self.tier,
                requested: size,
                used: self.used,
                capacity: self.capacity,
            });
        }

        let region = Region::new(self.cursor, size);
        self.cursor += size;
        self.used += size;
        self.peak = self.peak.max(self.used);
        Ok(Some(region))
    }

    /// Rewinds the cursor back to the base address.
    pub fn reset(&mut self) {
        self.cursor = self.base;
        self.used = 0;
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            cursor: self.cursor,
            used: self.used,
        }
    }

    /// Releases everything allocated after the checkpoint was taken.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.cursor <= self.cursor && checkpoint.used <= self.used);
        self.cursor = checkpoint.cursor;
        self.used = checkpoint.used;
    }

    pub fn available(&self) -> usize {
        self.capacity - self.used
    }

    /// Highest number of bytes in use since the last [`Arena::init`] or [`Arena::take_peak`].
    pub fn take_peak(&mut self) -> usize {
        std::mem::replace(&mut self.peak, self.used)
    }
}
