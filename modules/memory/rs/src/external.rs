use derive_getters::Getters;

use crate::transfer::Segments;
use crate::{Arena, MemoryError, Region, Tier, ALIGNMENT, MAX_TRANSFER};

/// Direction of a tier-to-tier copy.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum Direction {
    /// Fast tier -> external tier
    Store,
    /// External tier -> fast tier
    Load,
}

/// Number of hardware transfers issued and bytes moved since the last reset.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Hash, Getters)]
pub struct Traffic {
    transfers: usize,
    bytes: usize,
}

/// The external memory region owned by one worker.
///
/// Addresses handed out by the arena are offsets into `memory`. The only way to move bytes in
/// or out is [`ExternalTier::transfer`], which never issues a hardware transfer larger than
/// the configured limit.
#[derive(Clone, Debug)]
pub struct ExternalTier {
    arena: Arena,
    memory: Vec<u8>,
    max_transfer: usize,
    traffic: Traffic,
}

impl ExternalTier {
    pub fn new(capacity: usize) -> Self {
        Self::with_max_transfer(capacity, MAX_TRANSFER)
    }

    pub fn with_max_transfer(capacity: usize, max_transfer: usize) -> Self {
        debug_assert!(max_transfer > 0 && max_transfer % ALIGNMENT == 0);
        Self {
            arena: Arena::new(Tier::External, 0, capacity),
            memory: vec![0; capacity],
            max_transfer,
            traffic: Traffic::default(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn traffic(&self) -> Traffic {
        self.traffic
    }

    pub fn alloc(&mut self, size: usize) -> Result<Option<Region>, MemoryError> {
        self.arena.alloc(size)
    }

    /// Forgets every allocation. Bytes are left in place, exactly like the device memory.
    pub fn reset(&mut self) {
        self.arena.reset();
        self.traffic = Traffic::default();
    }

    /// Copies `local.len()` bytes between `local` and the external memory at `offset`.
    ///
    /// The local buffer must be padded to the tier alignment. The copy is issued as a sequence
    /// of hardware transfers, see [`Segments`].
    pub fn transfer(
        &mut self,
        direction: Direction,
        offset: usize,
        local: &mut [u8],
    ) -> Result<(), MemoryError> {
        self.check(offset, local.len())?;
        for (start, len) in Segments::with_chunk(local.len(), self.max_transfer) {
            let piece = &mut local[start..start + len];
            match direction {
                Direction::Store => self.dma_store(offset + start, piece)?,
                Direction::Load => self.dma_load(offset + start, piece)?,
            }
        }
        Ok(())
    }

    pub fn load(&mut self, offset: usize, local: &mut [u8]) -> Result<(), MemoryError> {
        self.transfer(Direction::Load, offset, local)
    }

    pub fn store(&mut self, offset: usize, local: &[u8]) -> Result<(), MemoryError> {
        self.check(offset, local.len())?;
        for (start, len) in Segments::with_chunk(local.len(), self.max_transfer) {
            self.dma_store(offset + start, &local[start..start + len])?;
        }
        Ok(())
    }

    fn check(&self, offset: usize, size: usize) -> Result<(), MemoryError> {
        if size % ALIGNMENT != 0 {
            return Err(MemoryError::Misaligned {
                size,
                alignment: ALIGNMENT,
            });
        }
        if offset % ALIGNMENT != 0 || offset + size > self.memory.len() {
            return Err(MemoryError::OutOfBounds {
                offset,
                size,
                capacity: self.memory.len(),
            });
        }
        Ok(())
    }

    // A single hardware transfer
    fn dma_store(&mut self, offset: usize, src: &[u8]) -> Result<(), MemoryError> {
        self.check_dma(offset, src.len())?;
        self.memory[offset..offset + src.len()].copy_from_slice(src);
        self.account(src.len());
        Ok(())
    }

    fn dma_load(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), MemoryError> {
        self.check_dma(offset, dst.len())?;
        dst.copy_from_slice(&self.memory[offset..offset + dst.len()]);
        self.account(dst.len());
        Ok(())
    }

    fn check_dma(&self, offset: usize, size: usize) -> Result<(), MemoryError> {
        if size > self.max_transfer {
            return Err(MemoryError::OversizedTransfer {
                size,
                limit: self.max_transfer,
            });
        }
        self.check(offset, size)
    }

    fn account(&mut self, bytes: usize) {
        self.traffic.transfers += 1;
        self.traffic.bytes += bytes;
    }
}
