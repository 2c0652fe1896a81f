use eyre::Result;
use log::trace;

use pimwave_core_rs::num::Offset;
use pimwave_memory_rs::Tiers;

use crate::pairwise::scoring::Costs;
use crate::pairwise::script::{EditScript, Op};
use crate::AlignmentError;

use super::{Component, Frame, Layer, Projection, Store};

/// A backtrace step: the operation that led into the current cell and where it came from.
struct Move {
    value: i32,
    op: Op,
    layer: Layer,
    cost: usize,
    dk: i32,
    doffset: i32,
}

/// Candidate predecessors of cell `(score, k)` in the given layer, in tie-breaking order:
/// deletion-extend, deletion-open, insertion-extend, insertion-open, mismatch.
fn candidates<O: Offset>(
    store: &mut Store<O>,
    tiers: &mut Tiers,
    frame: &Frame,
    costs: &Costs,
    score: usize,
    k: i32,
    layer: Layer,
) -> Result<[Move; 5]> {
    let extend = Costs::before(score, costs.extend);
    let open = Costs::before(score, costs.open);
    let mismatch = Costs::before(score, costs.mismatch).filter(|_| layer == Layer::M);

    let [extend, open, mismatch] = store.gather(
        tiers,
        [
            extend.map(|x| (x, Projection::Gaps)),
            open.map(|x| (x, Projection::Match)),
            mismatch.map(|x| (x, Projection::Match)),
        ],
    )?;

    let raw = |component: &Option<Component<O>>, layer: Layer, k: i32| {
        component
            .as_ref()
            .map_or(frame.null, |x| x.raw(layer, k).widen())
    };
    let (deletions, insertions) = (layer != Layer::I, layer != Layer::D);
    let gated = |enabled: bool, value: i32| if enabled { frame.clip(k, value) } else { frame.null };

    Ok([
        Move {
            value: gated(deletions, raw(&extend, Layer::D, k + 1)),
            op: Op::Deletion,
            layer: Layer::D,
            cost: costs.extend,
            dk: 1,
            doffset: 0,
        },
        Move {
            value: gated(deletions, raw(&open, Layer::M, k + 1)),
            op: Op::Deletion,
            layer: Layer::M,
            cost: costs.open,
            dk: 1,
            doffset: 0,
        },
        Move {
            value: gated(insertions, frame.succ(raw(&extend, Layer::I, k - 1))),
            op: Op::Insertion,
            layer: Layer::I,
            cost: costs.extend,
            dk: -1,
            doffset: -1,
        },
        Move {
            value: gated(insertions, frame.succ(raw(&open, Layer::M, k - 1))),
            op: Op::Insertion,
            layer: Layer::M,
            cost: costs.open,
            dk: -1,
            doffset: -1,
        },
        Move {
            value: frame.clip(k, frame.succ(raw(&mismatch, Layer::M, k))),
            op: Op::Mismatch,
            layer: Layer::M,
            cost: costs.mismatch,
            dk: 0,
            doffset: -1,
        },
    ])
}

/// Rebuilds the edit script ending at `offset` on the target diagonal of component `score`.
///
/// Predecessor components are read back from the external tier on demand and released from
/// the fast tier after every step.
pub(crate) fn backtrace<O: Offset>(
    store: &mut Store<O>,
    tiers: &mut Tiers,
    frame: &Frame,
    costs: &Costs,
    score: usize,
    offset: i32,
) -> Result<EditScript> {
    let mut script = EditScript::new((frame.plen + frame.tlen) as usize);
    let base = tiers.fast.checkpoint();

    let (mut score, mut k, mut offset, mut layer) = (score, frame.target(), offset, Layer::M);
    let fault = |score, k, offset| AlignmentError::Inconsistent { score, k, offset };

    while offset - k > 0 && offset > 0 && score > 0 {
        tiers.fast.rewind(base);
        let moves = candidates(store, tiers, frame, costs, score, k, layer)?;
        let best = moves
            .iter()
            .map(|x| x.value)
            .max()
            .and_then(|x| frame.option(x))
            .ok_or_else(|| fault(score, k, offset))?;

        if layer == Layer::M {
            // Trailing matches were covered by the extension step
            let matches = offset - best;
            if matches < 0 {
                return Err(fault(score, k, offset).into());
            }
            script.push_front(Op::Match, matches as usize)?;
            offset = best;
            if offset - k <= 0 || offset <= 0 {
                break;
            }
        } else if best != offset {
            return Err(fault(score, k, offset).into());
        }

        let Some(step) = moves.iter().find(|x| x.value == best) else {
            return Err(fault(score, k, offset).into());
        };
        trace!(
            "Backtrace {layer} at score {score}, diagonal {k}, offset {offset}: {}",
            step.op.symbol()
        );
        script.push_front(step.op, 1)?;
        score -= step.cost;
        k += step.dk;
        offset += step.doffset;
        layer = step.layer;
    }
    tiers.fast.rewind(base);

    let (v, h) = (offset - k, offset);
    if score == 0 {
        // The origin is only reachable through matches on the main diagonal
        if k != 0 || layer != Layer::M || offset < 0 {
            return Err(fault(score, k, offset).into());
        }
        script.push_front(Op::Match, offset as usize)?;
    } else {
        if v < 0 || h < 0 {
            return Err(fault(score, k, offset).into());
        }
        script.push_front(Op::Insertion, h as usize)?;
        script.push_front(Op::Deletion, v as usize)?;
    }
    Ok(script)
}
