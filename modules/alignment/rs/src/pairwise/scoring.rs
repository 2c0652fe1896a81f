use derive_getters::Dissolve;
use derive_more::Constructor;
use eyre::{ensure, Result};

/// Gap-affine penalty scheme.
///
/// Matches are free and every other event is penalized with a strictly positive amount. A gap
/// of length `n` costs `gap_open + n * gap_extend`.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Dissolve)]
pub struct Penalties {
    pub matches: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            matches: 0,
            mismatch: 3,
            gap_open: 4,
            gap_extend: 1,
        }
    }
}

impl Penalties {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.matches == 0,
            "Match score must be 0, got {}",
            self.matches
        );
        ensure!(
            self.mismatch > 0 && self.gap_open > 0 && self.gap_extend > 0,
            "Penalties must be strictly positive, got mismatch={}, gap open={}, gap extend={}",
            self.mismatch,
            self.gap_open,
            self.gap_extend
        );
        Ok(())
    }

    /// Cost of a gap of the given length.
    pub fn gap(&self, len: usize) -> i32 {
        if len == 0 {
            return 0;
        }
        self.gap_open + len as i32 * self.gap_extend
    }

    /// Score distances between a component and its predecessors.
    pub(crate) fn costs(&self) -> Costs {
        debug_assert!(self.validate().is_ok());
        Costs {
            mismatch: self.mismatch as usize,
            open: (self.gap_open + self.gap_extend) as usize,
            extend: self.gap_extend as usize,
        }
    }

    /// Largest score worth exploring for reads of length `read_len` with the expected
    /// `error_rate`: the costlier of spending every error on mismatches or on gap openings.
    pub fn max_score_for(&self, read_len: usize, error_rate: f64) -> usize {
        let errors = read_len as f64 * error_rate;
        let mismatches = errors * self.mismatch as f64;
        let gaps = errors * (self.gap_open + self.gap_extend) as f64;
        mismatches.max(gaps).ceil().max(0.0) as usize
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub(crate) struct Costs {
    pub mismatch: usize,
    pub open: usize,
    pub extend: usize,
}

impl Costs {
    #[inline(always)]
    pub fn before(score: usize, cost: usize) -> Option<usize> {
        score.checked_sub(cost)
    }
}
