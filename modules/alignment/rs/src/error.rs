use derive_more::{Display, Error};

/// Internal-consistency faults of the wavefront engine.
///
/// They indicate either a bug in the recurrence or corrupted persisted state and are never
/// retried.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Display, Error)]
pub enum AlignmentError {
    #[display("no predecessor explains offset {offset} on diagonal {k} at score {score}")]
    Inconsistent { score: usize, k: i32, offset: i32 },
    #[display(
        "persisted component for score {score} is corrupted: lo={lo}, hi={hi}, flags={flags:#04b}"
    )]
    CorruptedHeader {
        score: usize,
        lo: i32,
        hi: i32,
        flags: u8,
    },
    #[display("edit script does not fit into {capacity} operations")]
    ScriptOverflow { capacity: usize },
}
