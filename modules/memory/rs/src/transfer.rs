//! Splitting of large tier-to-tier copies into hardware-sized transfers.
//!
//! A transfer of `size` bytes is always padded to the tier alignment and then cut into
//! `chunk`-sized pieces followed by a single (rounded-up) remainder. Concatenating the pieces
//! yields exactly the bytes an unbounded transfer of the padded size would move.

use crate::{aligned, ALIGNMENT, MAX_TRANSFER};

/// Iterator over `(offset, len)` pieces of a segmented transfer, relative to its start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Segments {
    cursor: usize,
    total: usize,
    chunk: usize,
}

impl Segments {
    /// Pieces of a transfer of `size` bytes using the hardware limit [`MAX_TRANSFER`].
    pub fn new(size: usize) -> Self {
        Self::with_chunk(size, MAX_TRANSFER)
    }

    pub fn with_chunk(size: usize, chunk: usize) -> Self {
        debug_assert!(chunk > 0 && chunk % ALIGNMENT == 0);
        Self {
            cursor: 0,
            total: aligned(size),
            chunk,
        }
    }

    /// Total number of bytes moved, i.e. the padded transfer size.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for Segments {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.total {
            return None;
        }
        let len = self.chunk.min(self.total - self.cursor);
        let piece = (self.cursor, len);
        self.cursor += len;
        Some(piece)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.total - self.cursor).div_ceil(self.chunk);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Segments {}
