//! Error types for the [`resolve`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A resolver error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata resolution.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The notice exists but couldn't be read.
    #[display("failed to read notice: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The notice was read but isn't usable RDF/XML.
    #[display("failed to extract metadata from notice: {}", _0.display())]
    Extract(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
