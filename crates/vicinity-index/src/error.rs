//! Error types for vicinity-index.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected} entries, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, IndexError>;
