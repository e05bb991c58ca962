mod consts;
pub mod error;
mod extract;
mod graph;
pub mod models;
mod rdfxml;
mod slug;

use tracing::instrument;

use crate::error::Result;
pub use crate::extract::{Extractor, Row};
pub use crate::graph::{Graph, Literal, Term, Triple};
use crate::models::Metadata;
pub use crate::slug::{DEFAULT_MAX_LEN, FALLBACK_NAME, slugify};

/// Easy, top-level entrypoint for resolving [`Metadata`] from the raw bytes
/// of a Cellar RDF/XML notice.
///
/// A notice that parses but doesn't describe `identifier` in `language`
/// yields [`Metadata::fallback`]; only unreadable documents are errors.
#[instrument(skip(rdf), fields(rdf_size = rdf.as_ref().len()))]
pub fn extract(rdf: impl AsRef<[u8]>, identifier: &str, language: &str, max_len: usize) -> Result<Metadata> {
    Ok(Extractor::from_rdf_xml(rdf)?.metadata(identifier, language, max_len))
}
