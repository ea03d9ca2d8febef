/// Position or interval outside the bounds of the sequence.
///
/// Every fallible operation validates its arguments before touching the
/// tree, so a returned error means the sequence is unchanged.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    #[error("index {index} out of range for sequence of length {len}")]
    Index { index: usize, len: usize },
    #[error("range [{start}, {end}] out of range for sequence of length {len}")]
    Range { start: usize, end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, OutOfRange>;
