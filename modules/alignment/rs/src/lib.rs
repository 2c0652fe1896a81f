pub use error::AlignmentError;

mod error;
pub mod pairwise;
