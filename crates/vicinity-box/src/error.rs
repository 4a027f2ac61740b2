//! Error types for vicinity-box.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoxError {
    #[error("invalid box: {0}")]
    InvalidBox(String),
}

pub type Result<T> = std::result::Result<T, BoxError>;
