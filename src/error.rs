use thiserror::Error;

/// Failures reported by [`MinPq`](crate::MinPq) operations.
///
/// Every variant is recoverable: the queue is left exactly as it was before the
/// failing call.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The value is not currently queued.
    #[error("value not found in priority queue")]
    NotFound,
    /// The value is already queued (returned by `try_insert` only).
    #[error("value is already present in priority queue")]
    AlreadyPresent,
    #[error("branching factor must be at least 2, got {0}")]
    InvalidBranchingFactor(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
