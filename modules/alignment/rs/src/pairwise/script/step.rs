use std::borrow::Borrow;
use std::fmt::Display;

use derive_getters::{Dissolve, Getters};
use eyre::{eyre, Result};

use pimwave_core_rs::num::PrimUInt;

use super::op::Op;

/// A run of identical edit operations.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Getters, Dissolve)]
pub struct Step<Len: PrimUInt> {
    /// Number of repetitions, always greater than zero
    len: Len,
    op: Op,
}

impl<Len: PrimUInt> Step<Len> {
    pub fn new(op: Op, len: Len) -> Result<Self> {
        if len.is_zero() {
            return Err(eyre!("Step length must be greater than zero"));
        }
        Ok(Self { len, op })
    }

    /// Run-length encodes a sequence of operations. Runs longer than `Len::max_value()` are
    /// split into several steps.
    pub fn encode(ops: impl IntoIterator<Item = Op>) -> Vec<Step<Len>> {
        let mut steps: Vec<Step<Len>> = Vec::new();
        for op in ops {
            match steps.last_mut() {
                Some(last) if last.op == op && last.len < Len::max_value() => {
                    last.len = last.len + Len::one();
                }
                _ => steps.push(Step { len: Len::one(), op }),
            }
        }
        steps
    }

    pub fn rle_string(steps: impl Iterator<Item: Borrow<Step<Len>>>) -> String
    where
        Len: Display,
    {
        let mut result = String::with_capacity(steps.size_hint().0 * 3);
        for step in steps {
            let step = step.borrow();
            result.push_str(&step.len.to_string());
            result.push(step.op.symbol());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert!(Step::new(Op::Match, 0u8).is_err());
        assert_eq!(*Step::new(Op::Deletion, 3u8).unwrap().len(), 3);
    }

    #[test]
    fn test_encode() {
        let ops = [Op::Match, Op::Match, Op::Deletion, Op::Match, Op::Match];
        let steps = Step::<u32>::encode(ops);
        assert_eq!(Step::rle_string(steps.iter()), "2M1D2M");

        // Runs are split at the type limit
        let steps = Step::<u8>::encode(std::iter::repeat_n(Op::Insertion, 300));
        assert_eq!(Step::rle_string(steps.iter()), "255I45I");
        assert!(Step::<u8>::encode([]).is_empty());
    }
}
