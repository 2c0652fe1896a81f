use eyre::{ensure, eyre, Result};
use itertools::Itertools;

use crate::pairwise::scoring::Penalties;
use crate::AlignmentError;

use super::op::Op;
use super::step::Step;

/// Edit script of a single alignment.
///
/// The backtrace discovers operations from the end of both sequences towards their start, so
/// the script is filled back-to-front inside a buffer of `max_operations` slots. The valid
/// operations occupy `[begin, end)`.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct EditScript {
    buffer: Vec<Op>,
    begin: usize,
    end: usize,
}

impl EditScript {
    /// Empty script that can hold at most `max_operations` operations.
    pub fn new(max_operations: usize) -> Self {
        Self {
            buffer: vec![Op::Match; max_operations],
            begin: max_operations,
            end: max_operations,
        }
    }

    pub fn from_ops(ops: &[Op]) -> Self {
        Self {
            buffer: ops.to_vec(),
            begin: 0,
            end: ops.len(),
        }
    }

    /// Parses ASCII operation symbols.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let ops = bytes
            .iter()
            .map(|x| Op::try_from(*x).map_err(|_| eyre!("Unknown edit operation: {:?}", *x as char)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_ops(&ops))
    }

    /// Prepends `count` copies of `op`.
    pub fn push_front(&mut self, op: Op, count: usize) -> Result<(), AlignmentError> {
        if count > self.begin {
            return Err(AlignmentError::ScriptOverflow {
                capacity: self.buffer.len(),
            });
        }
        let begin = self.begin - count;
        self.buffer[begin..self.begin].fill(op);
        self.begin = begin;
        Ok(())
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn max_operations(&self) -> usize {
        self.buffer.len()
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn ops(&self) -> &[Op] {
        &self.buffer[self.begin..self.end]
    }

    /// Writes the operations as ASCII symbols, returning the number of bytes written.
    pub fn write_bytes(&self, dst: &mut [u8]) -> Result<usize, AlignmentError> {
        let ops = self.ops();
        if ops.len() > dst.len() {
            return Err(AlignmentError::ScriptOverflow {
                capacity: dst.len(),
            });
        }
        for (byte, op) in dst.iter_mut().zip(ops) {
            *byte = u8::from(*op);
        }
        Ok(ops.len())
    }

    pub fn steps(&self) -> Vec<Step<u32>> {
        Step::encode(self.ops().iter().copied())
    }

    /// Run-length encoded representation, e.g. `1M1D2M`.
    pub fn rle(&self) -> String {
        Step::rle_string(self.steps().iter())
    }

    /// Replays the script against the pattern and checks that it yields the text.
    pub fn validate(&self, pattern: &[u8], text: &[u8]) -> Result<()> {
        let (mut v, mut h) = (0usize, 0usize);
        for (i, op) in self.ops().iter().enumerate() {
            match op {
                Op::Match | Op::Mismatch => {
                    ensure!(
                        v < pattern.len() && h < text.len(),
                        "Operation #{i} ({}) runs past the end of the sequences",
                        op.symbol()
                    );
                    let equal = pattern[v] == text[h];
                    ensure!(
                        equal == (*op == Op::Match),
                        "Operation #{i} ({}) disagrees with pattern[{v}]={:?} and text[{h}]={:?}",
                        op.symbol(),
                        pattern[v] as char,
                        text[h] as char
                    );
                }
                Op::Insertion => ensure!(h < text.len(), "Insertion #{i} runs past the text"),
                Op::Deletion => ensure!(v < pattern.len(), "Deletion #{i} runs past the pattern"),
            }
            op.apply(&mut v, &mut h, 1usize);
        }
        ensure!(
            v == pattern.len() && h == text.len(),
            "Script consumes {v}/{} pattern and {h}/{} text symbols",
            pattern.len(),
            text.len()
        );
        Ok(())
    }

    /// Gap-affine penalty of the script.
    pub fn penalty(&self, penalties: &Penalties) -> i32 {
        self.ops()
            .iter()
            .chunk_by(|x| **x)
            .into_iter()
            .map(|(op, run)| match op {
                Op::Match => 0,
                Op::Mismatch => run.count() as i32 * penalties.mismatch,
                Op::Insertion | Op::Deletion => penalties.gap(run.count()),
            })
            .sum()
    }
}
