use derive_getters::Dissolve;
use derive_more::Constructor;

use crate::{aligned, MemoryError, Tier, ALIGNMENT};

/// Per-worker capacities of both tiers, in bytes.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Dissolve)]
pub struct Budget {
    pub fast: usize,
    pub external: usize,
}

impl Default for Budget {
    fn default() -> Self {
        // 64 KiB of scratch and a 1/16th share of a 64 MiB external memory
        Self {
            fast: 64 << 10,
            external: 4 << 20,
        }
    }
}

/// Static partitioning of the shared memories between workers.
///
/// Every worker receives an identical, disjoint window. Windows are laid out back to back
/// after a `reserved` prefix which holds the driver's own buffers.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Dissolve)]
pub struct Plan {
    workers: usize,
    reserved: usize,
    budget: Budget,
}

impl Plan {
    /// Splits `external_total` bytes (minus the `reserved` prefix) evenly between `workers`, giving
    /// each of them `fast` bytes of scratch memory carved out of `fast_total`.
    pub fn split(
        workers: usize,
        fast_total: usize,
        external_total: usize,
        reserved: usize,
    ) -> Result<Self, MemoryError> {
        let workers = workers.max(1);
        let reserved = aligned(reserved);
        let available = external_total.saturating_sub(reserved);
        let per_worker = (available / workers) / ALIGNMENT * ALIGNMENT;
        let fast = (fast_total / workers) / ALIGNMENT * ALIGNMENT;

        let plan = Self {
            workers,
            reserved,
            budget: Budget::new(fast, per_worker),
        };
        plan.validate(fast_total, external_total)?;
        Ok(plan)
    }

    /// Uses an explicit per-worker budget and checks that it fits into the totals.
    pub fn fixed(
        workers: usize,
        budget: Budget,
        fast_total: usize,
        external_total: usize,
        reserved: usize,
    ) -> Result<Self, MemoryError> {
        let plan = Self {
            workers: workers.max(1),
            reserved: aligned(reserved),
            budget,
        };
        plan.validate(fast_total, external_total)?;
        Ok(plan)
    }

    fn validate(&self, fast_total: usize, external_total: usize) -> Result<(), MemoryError> {
        let available = external_total.saturating_sub(self.reserved);
        let external = self.budget.external;
        if external == 0 || external.checked_mul(self.workers).is_none_or(|x| x > available) {
            return Err(MemoryError::Overcommitted {
                tier: Tier::External,
                workers: self.workers,
                per_worker: external,
                available,
            });
        }

        let fast = self.budget.fast;
        if fast == 0 || fast.checked_mul(self.workers).is_none_or(|x| x > fast_total) {
            return Err(MemoryError::Overcommitted {
                tier: Tier::Fast,
                workers: self.workers,
                per_worker: fast,
                available: fast_total,
            });
        }
        Ok(())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Address of the external window that belongs to the given worker.
    pub fn external_base(&self, worker: usize) -> usize {
        debug_assert!(worker < self.workers);
        self.reserved + worker * self.budget.external
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_evenly() {
        let plan = Plan::split(16, 64_000, 64 << 20, 1000).unwrap();
        assert_eq!(plan.workers(), 16);
        assert_eq!(plan.budget().fast, 4000);
        assert_eq!(plan.budget().external % ALIGNMENT, 0);
        assert!(plan.budget().external * 16 <= (64 << 20) - 1000);

        // Windows are disjoint and ordered
        for worker in 1..16 {
            assert_eq!(
                plan.external_base(worker) - plan.external_base(worker - 1),
                plan.budget().external
            );
        }
        assert_eq!(plan.external_base(0), 1000);
    }

    #[test]
    fn test_overcommitted() {
        let err = Plan::fixed(4, Budget::new(1024, 1 << 20), 1 << 20, 3 << 20, 0).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::Overcommitted {
                tier: Tier::External,
                workers: 4,
                ..
            }
        ));

        let err = Plan::fixed(4, Budget::new(1024, 1024), 2048, 1 << 20, 0).unwrap_err();
        assert!(matches!(err, MemoryError::Overcommitted { tier: Tier::Fast, .. }));

        assert!(Plan::split(8, 4096, 32, 0).is_err());
        assert!(Plan::fixed(2, Budget::new(1024, 1024), 2048, 2048, 0).is_ok());
    }
}
