//! Metadata lookup for archive items.
//!
//! The organizer only ever asks one question: "what is known about this
//! identifier, in this language?". [`MetadataResolver`] is that question;
//! [`CellarResolver`] answers it from the per-identifier RDF/XML notices of a
//! Cellar metadata dump.

mod cellar;
pub mod error;

pub use self::cellar::{CellarResolver, DEFAULT_RDF_FILENAME};

use crate::resolve::error::Result;
use std::path::PathBuf;
use undump_extract::models::Metadata;

/// Outcome of looking an identifier up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A record, possibly made of placeholder values if nothing matched.
    Found(Metadata),
    /// There is no metadata document for the identifier at all.
    Missing { expected: PathBuf },
}

pub trait MetadataResolver {
    /// Looks up `identifier`, preferring titles in `language` (e.g. `ENG`).
    ///
    /// Only problems reading an existing document are errors; a missing one
    /// is [`Resolution::Missing`].
    fn resolve(&self, identifier: &str, language: &str) -> Result<Resolution>;
}
