use log::debug;

use crate::{Arena, Budget, ExternalTier, Tier};

/// Both memory tiers owned by a single worker.
///
/// The fast tier is modeled by an accounting arena: buffers live on the heap but every one of
/// them is charged against the fast budget first. The external tier keeps real bytes.
#[derive(Clone, Debug)]
pub struct Tiers {
    pub fast: Arena,
    pub external: ExternalTier,
}

impl Tiers {
    pub fn new(budget: Budget) -> Self {
        Self {
            fast: Arena::new(Tier::Fast, 0, budget.fast),
            external: ExternalTier::new(budget.external),
        }
    }

    pub fn budget(&self) -> Budget {
        Budget::new(*self.fast.capacity(), *self.external.arena().capacity())
    }

    /// Forgets every allocation in both tiers. Called between independent problems.
    pub fn reset(&mut self) {
        self.fast.reset();
        self.external.reset();
    }

    /// Reports and clears the fast tier high-water mark together with the external usage.
    pub fn take_usage(&mut self) -> (usize, usize) {
        let fast = self.fast.take_peak();
        let external = *self.external.arena().used();
        debug!(
            "Peak memory usage: {fast}/{} fast bytes, {external}/{} external bytes",
            self.fast.capacity(),
            self.external.arena().capacity()
        );
        (fast, external)
    }
}
