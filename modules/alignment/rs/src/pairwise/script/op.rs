use pimwave_core_rs::num::PrimUInt;

/// A single edit operation transforming the pattern into the text.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum Op {
    /// Identical symbols in both sequences (M)
    Match,
    /// Different symbols in both sequences (X)
    Mismatch,
    /// A text symbol missing from the pattern (I)
    Insertion,
    /// A pattern symbol missing from the text (D)
    Deletion,
}

impl Op {
    /// Returns `true` if the operation consumes a symbol from both sequences.
    pub fn is_diagonal(&self) -> bool {
        matches!(self, Op::Match | Op::Mismatch)
    }

    pub fn symbol(&self) -> char {
        match self {
            Op::Match => 'M',
            Op::Mismatch => 'X',
            Op::Insertion => 'I',
            Op::Deletion => 'D',
        }
    }

    /// Advances pattern/text positions past `len` repetitions of the operation.
    pub fn apply<Len, Idx>(&self, pattern: &mut Idx, text: &mut Idx, len: Len)
    where
        Len: PrimUInt + Into<Idx>,
        Idx: PrimUInt,
    {
        match self {
            Op::Insertion => *text = *text + len.into(),
            Op::Deletion => *pattern = *pattern + len.into(),
            Op::Match | Op::Mismatch => {
                *pattern = *pattern + len.into();
                *text = *text + len.into();
            }
        }
    }
}

impl From<Op> for u8 {
    fn from(op: Op) -> Self {
        op.symbol() as u8
    }
}

impl TryFrom<char> for Op {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'M' => Ok(Op::Match),
            'X' => Ok(Op::Mismatch),
            'I' => Ok(Op::Insertion),
            'D' => Ok(Op::Deletion),
            _ => Err(()),
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Op::try_from(value as char)
    }
}
