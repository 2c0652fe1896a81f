pub use arena::{Arena, Checkpoint, Region, Tier};
pub use error::MemoryError;
pub use external::{Direction, ExternalTier, Traffic};
pub use plan::{Budget, Plan};
pub use tiers::Tiers;
pub use transfer::Segments;

mod arena;
mod error;
mod external;
mod plan;
mod tiers;
pub mod transfer;

/// Allocation and transfer granularity of both tiers, in bytes.
pub const ALIGNMENT: usize = 8;

/// Largest number of bytes a single tier-to-tier transfer may move.
pub const MAX_TRANSFER: usize = 2048;

/// Rounds `size` up to the next multiple of [`ALIGNMENT`].
#[inline(always)]
pub const fn aligned(size: usize) -> usize {
    size.div_ceil(ALIGNMENT) * ALIGNMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned() {
        for (size, expected) in [(0, 0), (1, 8), (7, 8), (8, 8), (9, 16), (2047, 2048)] {
            assert_eq!(aligned(size), expected);
        }
    }
}
