//! Error types for vicinity-query.
//!
//! Everything here is a programming or configuration error, detected
//! eagerly at query entry — there are no retryable failures in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Box(#[from] vicinity_box::BoxError),

    #[error(transparent)]
    Index(#[from] vicinity_index::IndexError),

    #[error("query box does not match the index box")]
    BoxMismatch,

    #[error("invalid query parameter: {0}")]
    InvalidParameter(String),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, QueryError>;
