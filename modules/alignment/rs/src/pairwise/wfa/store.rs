use std::marker::PhantomData;

use eyre::Result;

use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::{Region, Tiers};

use super::component::{Component, Header, HEADER_BYTES};
use super::{Kernel, Layer, Projection};

/// Score-indexed storage of wavefront components.
///
/// Every slot either points to the external-tier region holding the persisted component for
/// that score or is empty, meaning no component exists for the score. Components in use are
/// charged against the fast tier; callers reclaim that space by rewinding the fast arena.
#[derive(Clone, Debug)]
pub struct Store<O: Offset> {
    slots: Vec<Option<Region>>,
    staging: Vec<u8>,
    phantom: PhantomData<O>,
}

impl<O: Offset> Store<O> {
    pub fn new(max_score: usize) -> Self {
        Self {
            slots: vec![None; max_score + 1],
            staging: Vec::new(),
            phantom: PhantomData,
        }
    }

    /// Forgets every component and resizes the index for a new score bound.
    pub fn reset(&mut self, max_score: usize) {
        self.slots.clear();
        self.slots.resize(max_score + 1, None);
    }

    pub fn slot(&self, score: usize) -> Option<Region> {
        self.slots.get(score).copied().flatten()
    }

    /// Marks the score as having no component.
    pub fn forget(&mut self, score: usize) {
        if let Some(slot) = self.slots.get_mut(score) {
            *slot = None;
        }
    }

    /// Creates a null-filled component for `score`, charging the fast tier for its header and
    /// layers and reserving the external slot it will be persisted to.
    pub fn allocate(
        &mut self,
        tiers: &mut Tiers,
        score: usize,
        lo: i32,
        hi: i32,
        kernel: Kernel,
    ) -> Result<Component<O>> {
        debug_assert!(lo <= hi);
        let header = Header::new(lo, hi, kernel);

        tiers.fast.alloc(HEADER_BYTES)?;
        for _ in kernel.layers() {
            tiers.fast.alloc(header.layer_bytes::<O>())?;
        }
        self.slots[score] = tiers.external.alloc(header.footprint::<O>())?;

        Ok(Component::new(header))
    }

    /// Writes the header and every present layer of the component to its slot. Components
    /// without a slot are silently skipped.
    pub fn persist(&mut self, tiers: &mut Tiers, score: usize, component: &Component<O>) -> Result<()> {
        let Some(region) = self.slot(score) else {
            return Ok(());
        };

        let header = *component.header();
        let (footprint, layer_bytes) = (header.footprint::<O>(), header.layer_bytes::<O>());
        debug_assert!(footprint <= *region.len());

        self.staging.clear();
        self.staging.resize(footprint, 0);
        header.encode(&mut self.staging);
        for layer in header.kernel().layers() {
            let start = header.layer_offset::<O>(layer);
            let dst = &mut self.staging[start..start + layer_bytes];
            let values = component.layer(layer).unwrap_or_default();
            for (chunk, value) in dst.chunks_exact_mut(O::BYTES).zip(values) {
                value.write_le(chunk);
            }
        }

        tiers.external.store(*region.start(), &self.staging)?;
        Ok(())
    }

    /// Reads the header of a persisted component.
    pub fn header(&mut self, tiers: &mut Tiers, score: usize) -> Result<Option<Header>> {
        let Some(region) = self.slot(score) else {
            return Ok(None);
        };
        let mut buffer = [0u8; HEADER_BYTES];
        tiers.external.load(*region.start(), &mut buffer)?;
        Ok(Some(Header::decode(score, &buffer)?))
    }

    /// Reads back the requested layers of a persisted component. Only these layers are
    /// transferred and charged to the fast tier.
    pub fn retrieve(
        &mut self,
        tiers: &mut Tiers,
        score: usize,
        projection: Projection,
    ) -> Result<Option<Component<O>>> {
        let Some(header) = self.header(tiers, score)? else {
            return Ok(None);
        };
        let Some(region) = self.slot(score) else {
            return Ok(None);
        };
        tiers.fast.alloc(HEADER_BYTES)?;

        let mut component = Component::projected(header, projection);
        let layer_bytes = header.layer_bytes::<O>();
        for layer in [Layer::M, Layer::I, Layer::D] {
            let Some(values) = component.layer_mut(layer) else {
                continue;
            };
            tiers.fast.alloc(layer_bytes)?;

            self.staging.clear();
            self.staging.resize(layer_bytes, 0);
            let offset = region.start() + header.layer_offset::<O>(layer);
            tiers.external.load(offset, &mut self.staging)?;

            for (value, chunk) in values.iter_mut().zip(self.staging.chunks_exact(O::BYTES)) {
                *value = O::read_le(chunk);
            }
        }
        Ok(Some(component))
    }

    /// Retrieves several components at once. Requests for the same score are merged into a
    /// single transfer of the union of their projections.
    pub(crate) fn gather<const N: usize>(
        &mut self,
        tiers: &mut Tiers,
        requests: [Option<(usize, Projection)>; N],
    ) -> Result<[Option<Component<O>>; N]> {
        let mut merged: Vec<(usize, Projection)> = Vec::with_capacity(N);
        for (score, projection) in requests.iter().flatten() {
            match merged.iter_mut().find(|x| x.0 == *score) {
                Some(x) => x.1 = x.1.union(*projection),
                None => merged.push((*score, *projection)),
            }
        }

        let mut retrieved = Vec::with_capacity(merged.len());
        for (score, projection) in merged {
            retrieved.push((score, self.retrieve(tiers, score, projection)?));
        }
        Ok(requests.map(|request| {
            let (score, _) = request?;
            retrieved
                .iter()
                .find(|x| x.0 == score)
                .and_then(|x| x.1.clone())
        }))
    }
}
