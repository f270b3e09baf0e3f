use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Interval start {start} is greater than its end {end}")]
    InvalidInterval { start: u64, end: u64 },

    #[error("Leaf fanout must be at least 1")]
    ZeroLeafFanout,
}
