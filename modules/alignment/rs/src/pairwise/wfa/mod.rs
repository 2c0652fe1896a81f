//! Gap-affine wavefront alignment.
//!
//! A wavefront (component) holds, for a single score `s`, the furthest offset reachable on
//! every diagonal `k = h - v` of a contiguous band `[lo, hi]`. Three layers are tracked: `M`
//! (ends with a match or mismatch), `I` (ends with an insertion) and `D` (ends with a
//! deletion). Components are persisted to the external tier as soon as they are complete and
//! read back whenever a later score or the backtrace needs them.

pub use component::{Component, Header};
pub use engine::{Aligner, Alignment, State, Status};
pub use reduce::{Adaptive, Reduction};
pub use store::Store;

mod backtrace;
mod component;
mod compute;
mod engine;
mod extend;
pub mod reduce;
mod store;

use derive_more::Display;

use pimwave_core_rs::num::Offset;

/// Wavefront layer.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Display)]
pub enum Layer {
    M,
    I,
    D,
}

/// Bit mask of the optional gap layers present in a component. `M` always exists.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash)]
pub struct Kernel(u8);

impl Kernel {
    const D: u8 = 0b01;
    const I: u8 = 0b10;

    pub const M_ONLY: Kernel = Kernel(0);

    pub fn new(insertions: bool, deletions: bool) -> Self {
        let mut bits = 0;
        if insertions {
            bits |= Self::I;
        }
        if deletions {
            bits |= Self::D;
        }
        Kernel(bits)
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits <= (Self::I | Self::D)).then_some(Kernel(bits))
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn has(&self, layer: Layer) -> bool {
        match layer {
            Layer::M => true,
            Layer::I => self.0 & Self::I != 0,
            Layer::D => self.0 & Self::D != 0,
        }
    }

    /// Present layers in storage order.
    pub fn layers(&self) -> impl Iterator<Item = Layer> + '_ {
        [Layer::M, Layer::I, Layer::D]
            .into_iter()
            .filter(|x| self.has(*x))
    }
}

/// Subset of layers requested when a component is read back.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Projection {
    /// Only `M`: mismatch and gap-open predecessors
    Match,
    /// Only `I` and `D`: gap-extend predecessors
    Gaps,
    All,
}

impl Projection {
    pub fn wants(&self, layer: Layer) -> bool {
        match self {
            Projection::Match => layer == Layer::M,
            Projection::Gaps => layer != Layer::M,
            Projection::All => true,
        }
    }

    pub fn union(self, other: Projection) -> Projection {
        if self == other {
            self
        } else {
            Projection::All
        }
    }
}

/// Boundaries of the DP matrix for a single pattern/text pair.
///
/// All offsets are handled as widened `i32` with the widened sentinel marking "no coordinate".
/// Any value outside the matrix is turned into the sentinel, both during the forward pass and
/// during the backtrace, so the two always agree.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub(crate) struct Frame {
    pub plen: i32,
    pub tlen: i32,
    pub null: i32,
}

impl Frame {
    pub fn new<O: Offset>(pattern: &[u8], text: &[u8]) -> Self {
        Self {
            plen: pattern.len() as i32,
            tlen: text.len() as i32,
            null: O::NULL.widen(),
        }
    }

    /// Diagonal of the bottom-right corner of the matrix.
    #[inline(always)]
    pub fn target(&self) -> i32 {
        self.tlen - self.plen
    }

    #[inline(always)]
    pub fn succ(&self, offset: i32) -> i32 {
        if offset == self.null {
            self.null
        } else {
            offset + 1
        }
    }

    /// Keeps `offset` only if the cell it addresses on diagonal `k` lies inside the matrix.
    #[inline(always)]
    pub fn clip(&self, k: i32, offset: i32) -> i32 {
        if offset == self.null || offset > self.tlen || offset < k || offset - k > self.plen {
            self.null
        } else {
            offset
        }
    }

    #[inline(always)]
    pub fn option(&self, offset: i32) -> Option<i32> {
        (offset != self.null).then_some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel() {
        assert_eq!(Kernel::new(true, true).bits(), 3);
        assert_eq!(Kernel::new(true, false).bits(), 2);
        assert_eq!(Kernel::new(false, true).bits(), 1);
        assert_eq!(Kernel::from_bits(4), None);

        let kernel = Kernel::new(false, true);
        assert_eq!(kernel.layers().collect::<Vec<_>>(), vec![Layer::M, Layer::D]);
        assert!(!kernel.has(Layer::I));
    }

    #[test]
    fn test_projection() {
        assert!(Projection::Match.wants(Layer::M) && !Projection::Match.wants(Layer::D));
        assert!(Projection::Gaps.wants(Layer::I) && !Projection::Gaps.wants(Layer::M));
        assert_eq!(Projection::Match.union(Projection::Gaps), Projection::All);
        assert_eq!(Projection::Gaps.union(Projection::Gaps), Projection::Gaps);
    }

    #[test]
    fn test_frame() {
        let frame = Frame::new::<i16>(b"ACGT", b"AGT");
        assert_eq!(frame.target(), -1);
        assert_eq!(frame.succ(frame.null), frame.null);
        assert_eq!(frame.succ(2), 3);

        // h beyond the text, v beyond the pattern, v below zero
        assert_eq!(frame.clip(0, 4), frame.null);
        assert_eq!(frame.clip(-2, 3), frame.null);
        assert_eq!(frame.clip(1, 0), frame.null);
        assert_eq!(frame.clip(-1, 3), 3);
        assert_eq!(frame.option(frame.null), None);
    }
}
