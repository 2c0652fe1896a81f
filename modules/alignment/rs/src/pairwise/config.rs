use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, Result};

use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::Budget;

use super::scoring::Penalties;
use super::wfa::reduce::Adaptive;

#[derive(Clone, Copy, PartialEq, Debug, Constructor, Dissolve)]
pub struct Config {
    pub penalties: Penalties,
    // Alignments that did not reach the end by this score are abandoned
    pub max_score: usize,
    pub max_read_len: usize,
    // Reconstruct the edit script after the score is found
    pub backtrace: bool,
    // Lossy band reduction, disabled by default
    pub reduction: Option<Adaptive>,
    // Per-worker memory
    pub budget: Budget,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            penalties: Penalties::default(),
            max_score: 250,
            max_read_len: 110,
            backtrace: true,
            reduction: None,
            budget: Budget::default(),
        }
    }
}

impl Config {
    /// Checks the configuration against the offset type `O` used to store wavefronts.
    pub fn validate<O: Offset>(&self) -> Result<()> {
        self.penalties.validate()?;
        ensure!(self.max_score >= 1, "Max score must be at least 1");
        ensure!(self.max_read_len >= 1, "Max read length must be at least 1");

        let limit = O::max_value().widen() as usize;
        ensure!(
            self.max_read_len <= limit,
            "Max read length {} does not fit into {}-byte offsets (limit {})",
            self.max_read_len,
            O::BYTES,
            limit
        );
        Ok(())
    }

    /// Size of the edit-script buffer for a single pair.
    pub fn max_operations(&self) -> usize {
        2 * self.max_read_len
    }
}
