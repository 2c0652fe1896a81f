//! Optional band reduction.
//!
//! Reduction trims diagonals that lag far behind the best one. It is a lossy heuristic: the
//! reported score is no longer guaranteed to be optimal once it is enabled.

use std::fmt::Debug;

use derive_getters::Dissolve;
use derive_more::Constructor;

use pimwave_core_rs::num::Offset;

use super::{Component, Frame, Layer};

pub trait Reduction: Debug + Send + Sync {
    /// Returns the sub-band of `[lo, hi]` to keep. `distances[k - lo]` is the number of symbols
    /// left to reach the end of the matrix from diagonal `k` (`None` for null offsets). The
    /// returned band must be non-empty.
    fn band(&self, lo: i32, hi: i32, target: i32, distances: &[Option<i32>]) -> (i32, i32);
}

/// Drops band endpoints whose distance to the end exceeds the best distance in the band by
/// more than `max_distance_threshold`. Bands narrower than `min_wavefront_length` are kept and
/// the target diagonal is never removed.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Constructor, Dissolve)]
pub struct Adaptive {
    pub min_wavefront_length: usize,
    pub max_distance_threshold: i32,
}

impl Default for Adaptive {
    fn default() -> Self {
        Self {
            min_wavefront_length: 10,
            max_distance_threshold: 50,
        }
    }
}

impl Reduction for Adaptive {
    fn band(&self, lo: i32, hi: i32, target: i32, distances: &[Option<i32>]) -> (i32, i32) {
        debug_assert_eq!(distances.len(), (hi - lo + 1) as usize);
        if distances.len() < self.min_wavefront_length {
            return (lo, hi);
        }
        let Some(best) = distances.iter().flatten().min() else {
            return (lo, hi);
        };
        let limit = best + self.max_distance_threshold;
        let far = |k: i32| distances[(k - lo) as usize].is_none_or(|x| x > limit);

        let (mut top, mut bottom) = (lo, hi);
        while top < target && top < bottom && far(top) {
            top += 1;
        }
        while bottom > target && bottom > top && far(bottom) {
            bottom -= 1;
        }
        (top, bottom)
    }
}

/// Applies the reduction to a freshly extended component.
pub(crate) fn reduce<O: Offset>(
    reduction: &dyn Reduction,
    component: &mut Component<O>,
    frame: &Frame,
) {
    let (lo, hi) = (component.lo(), component.hi());
    let distances: Vec<Option<i32>> = (lo..=hi)
        .map(|k| {
            component.get(Layer::M, k).map(|offset| {
                let h = offset.widen();
                (frame.tlen - h).max(frame.plen - (h - k))
            })
        })
        .collect();

    let (top, bottom) = reduction.band(lo, hi, frame.target(), &distances);
    if (top, bottom) != (lo, hi) {
        component.shrink(top, bottom);
    }
}
