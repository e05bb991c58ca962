//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive could not be enumerated.
    #[display("failed to scan archive")]
    Scan,
    /// A single item could not be organized.
    #[display("failed to organize {}", _0.display())]
    Organize(#[error(not(source))] PathBuf),
    /// A destination path could not be rendered from its masks.
    #[display("issue with path generation from template")]
    Template,
    /// A mask doesn't parse; raised once, before anything is processed.
    #[display("invalid mask: {_0}")]
    InvalidMask(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
