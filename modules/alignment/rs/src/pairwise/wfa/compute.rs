use pimwave_core_rs::num::Offset;

use super::{Component, Frame, Header, Kernel, Layer};

/// Components a new score is derived from. The same component may serve several roles.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Predecessors<'a, O: Offset> {
    /// `s - mismatch`
    pub mismatch: Option<&'a Component<O>>,
    /// `s - gap_open - gap_extend`
    pub open: Option<&'a Component<O>>,
    /// `s - gap_extend`
    pub extend: Option<&'a Component<O>>,
}

/// Band and kernel of the component derived from predecessors with the given headers, or `None`
/// when no predecessor can contribute.
pub(crate) fn span(
    mismatch: Option<&Header>,
    open: Option<&Header>,
    extend: Option<&Header>,
    frame: &Frame,
) -> Option<Header> {
    let insertions = open.is_some() || extend.is_some_and(|x| x.kernel().has(Layer::I));
    let deletions = open.is_some() || extend.is_some_and(|x| x.kernel().has(Layer::D));
    let extend = extend.filter(|_| insertions || deletions);
    if mismatch.is_none() && open.is_none() && extend.is_none() {
        return None;
    }

    let mut lo = i32::MAX;
    let mut hi = i32::MIN;
    if let Some(x) = mismatch {
        lo = lo.min(*x.lo());
        hi = hi.max(*x.hi());
    }
    for x in [open, extend].into_iter().flatten() {
        lo = lo.min(*x.lo() - 1);
        hi = hi.max(*x.hi() + 1);
    }

    // Diagonals outside of the matrix can't hold a single valid offset
    let (lo, hi) = (lo.max(-frame.plen), hi.min(frame.tlen));
    (lo <= hi).then(|| Header::new(lo, hi, Kernel::new(insertions, deletions)))
}

/// Fills `next` with the gap-affine recurrence:
///
/// ```text
/// I[k] = max(M_open[k-1], I_extend[k-1]) + 1
/// D[k] = max(M_open[k+1], D_extend[k+1])
/// M[k] = max(D[k], I[k], M_mismatch[k] + 1)
/// ```
///
/// Every candidate is clipped to the matrix before taking the maximum, and null candidates
/// never take part in the `+ 1`.
pub(crate) fn compute<O: Offset>(
    predecessors: &Predecessors<'_, O>,
    frame: &Frame,
    next: &mut Component<O>,
) {
    let raw = |component: Option<&Component<O>>, layer: Layer, k: i32| {
        component.map_or(frame.null, |x| x.raw(layer, k).widen())
    };
    let Predecessors {
        mismatch,
        open,
        extend,
    } = *predecessors;

    let kernel = next.kernel();
    for k in next.lo()..=next.hi() {
        let ins = frame
            .clip(k, frame.succ(raw(open, Layer::M, k - 1)))
            .max(frame.clip(k, frame.succ(raw(extend, Layer::I, k - 1))));
        let del = frame
            .clip(k, raw(open, Layer::M, k + 1))
            .max(frame.clip(k, raw(extend, Layer::D, k + 1)));
        let misms = frame.clip(k, frame.succ(raw(mismatch, Layer::M, k)));

        if kernel.has(Layer::I) {
            next.set(Layer::I, k, O::narrow(ins));
        }
        if kernel.has(Layer::D) {
            next.set(Layer::D, k, O::narrow(del));
        }
        next.set(Layer::M, k, O::narrow(ins.max(del).max(misms)));
    }
}
