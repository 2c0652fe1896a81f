use derive_getters::Getters;
use derive_more::Constructor;

use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::aligned;

use crate::AlignmentError;

use super::{Kernel, Layer, Projection};

/// Encoded size of a [`Header`] in the external tier.
pub const HEADER_BYTES: usize = 16;

/// Fixed-size prefix of a persisted component: `lo` and `hi` as little-endian `i32` followed by
/// the kernel flags and padding. Layers follow in `M`, `I`, `D` order, each padded to the
/// tier alignment.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Getters)]
pub struct Header {
    lo: i32,
    hi: i32,
    kernel: Kernel,
}

impl Header {
    pub fn width(&self) -> usize {
        (self.hi - self.lo + 1) as usize
    }

    pub fn layer_bytes<O: Offset>(&self) -> usize {
        aligned(self.width() * O::BYTES)
    }

    /// Total persisted size of the component.
    pub fn footprint<O: Offset>(&self) -> usize {
        HEADER_BYTES + self.kernel.layers().count() * self.layer_bytes::<O>()
    }

    /// Position of a present layer relative to the start of the persisted component.
    pub fn layer_offset<O: Offset>(&self, layer: Layer) -> usize {
        debug_assert!(self.kernel.has(layer));
        let before = self.kernel.layers().take_while(|x| *x != layer).count();
        HEADER_BYTES + before * self.layer_bytes::<O>()
    }

    pub fn encode(&self, dst: &mut [u8]) {
        dst[..HEADER_BYTES].fill(0);
        dst[0..4].copy_from_slice(&self.lo.to_le_bytes());
        dst[4..8].copy_from_slice(&self.hi.to_le_bytes());
        dst[8] = self.kernel.bits();
    }

    pub fn decode(score: usize, src: &[u8]) -> Result<Self, AlignmentError> {
        let word = |at: usize| i32::from_le_bytes([src[at], src[at + 1], src[at + 2], src[at + 3]]);
        let (lo, hi, flags) = (word(0), word(4), src[8]);

        match Kernel::from_bits(flags) {
            Some(kernel) if hi >= lo => Ok(Self { lo, hi, kernel }),
            _ => Err(AlignmentError::CorruptedHeader {
                score,
                lo,
                hi,
                flags,
            }),
        }
    }
}

/// One score's wavefront: an explicit `(lo, hi, layers)` triple with bounds-checked access.
///
/// Layers that are absent from the kernel, or were not requested when the component was read
/// back, read as the null sentinel on every diagonal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Component<O: Offset> {
    header: Header,
    m: Option<Vec<O>>,
    i: Option<Vec<O>>,
    d: Option<Vec<O>>,
}

impl<O: Offset> Component<O> {
    /// A component with every present layer set to null.
    pub fn new(header: Header) -> Self {
        Self::projected(header, Projection::All)
    }

    pub(crate) fn projected(header: Header, projection: Projection) -> Self {
        let layer = |layer: Layer| {
            (header.kernel.has(layer) && projection.wants(layer))
                .then(|| vec![O::NULL; header.width()])
        };
        Self {
            header,
            m: layer(Layer::M),
            i: layer(Layer::I),
            d: layer(Layer::D),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn lo(&self) -> i32 {
        self.header.lo
    }

    pub fn hi(&self) -> i32 {
        self.header.hi
    }

    pub fn kernel(&self) -> Kernel {
        self.header.kernel
    }

    pub fn contains(&self, k: i32) -> bool {
        self.header.lo <= k && k <= self.header.hi
    }

    pub fn layer(&self, layer: Layer) -> Option<&[O]> {
        match layer {
            Layer::M => self.m.as_deref(),
            Layer::I => self.i.as_deref(),
            Layer::D => self.d.as_deref(),
        }
    }

    pub fn layer_mut(&mut self, layer: Layer) -> Option<&mut [O]> {
        match layer {
            Layer::M => self.m.as_deref_mut(),
            Layer::I => self.i.as_deref_mut(),
            Layer::D => self.d.as_deref_mut(),
        }
    }

    /// Raw offset on diagonal `k`, [`Offset::NULL`] when there is none.
    #[inline(always)]
    pub fn raw(&self, layer: Layer, k: i32) -> O {
        match (self.layer(layer), self.contains(k)) {
            (Some(values), true) => values[(k - self.header.lo) as usize],
            _ => O::NULL,
        }
    }

    pub fn get(&self, layer: Layer, k: i32) -> Option<O> {
        let value = self.raw(layer, k);
        (!value.is_null()).then_some(value)
    }

    pub fn set(&mut self, layer: Layer, k: i32, value: O) {
        debug_assert!(self.contains(k), "diagonal {k} is outside of the component");
        let lo = self.header.lo;
        if let Some(values) = self.layer_mut(layer) {
            values[(k - lo) as usize] = value;
        }
    }

    /// Drops every diagonal outside of `[lo, hi]`.
    pub fn shrink(&mut self, lo: i32, hi: i32) {
        debug_assert!(self.header.lo <= lo && lo <= hi && hi <= self.header.hi);
        let (skip, keep) = ((lo - self.header.lo) as usize, (hi - lo + 1) as usize);
        for values in [&mut self.m, &mut self.i, &mut self.d].into_iter().flatten() {
            values.drain(..skip);
            values.truncate(keep);
        }
        self.header.lo = lo;
        self.header.hi = hi;
    }
}
