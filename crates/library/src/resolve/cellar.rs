use crate::resolve::error::{ErrorKind, Result};
use crate::resolve::{MetadataResolver, Resolution};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;
use undump_extract::{DEFAULT_MAX_LEN, extract};

pub const DEFAULT_RDF_FILENAME: &str = "tree_non_inferred.rdf";

/// Reads `<root>/<identifier>/<filename>` and runs the Cellar lookup on it.
///
/// Nothing is cached: every call reads and parses the notice again, even when
/// several files in a row share an identifier.
#[derive(Debug, Clone)]
pub struct CellarResolver {
    root: PathBuf,
    filename: String,
    max_segment_len: usize,
}
impl CellarResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filename: DEFAULT_RDF_FILENAME.to_string(),
            max_segment_len: DEFAULT_MAX_LEN,
        }
    }

    /// Use a different notice file name inside each identifier directory.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Maximum length of the sanitized title.
    pub fn with_max_segment_len(mut self, max_segment_len: usize) -> Self {
        self.max_segment_len = max_segment_len;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the notice for `identifier` is expected to be.
    pub fn notice_path(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier).join(&self.filename)
    }
}
impl MetadataResolver for CellarResolver {
    #[instrument(skip(self))]
    fn resolve(&self, identifier: &str, language: &str) -> Result<Resolution> {
        let path = self.notice_path(identifier);
        if !path.is_file() {
            return Ok(Resolution::Missing { expected: path });
        }
        tracing::debug!(path = %path.display(), "Found matching notice");
        let rdf = fs::read(&path).or_raise(|| ErrorKind::Io(path.clone()))?;
        let metadata =
            extract(&rdf, identifier, language, self.max_segment_len).or_raise(|| ErrorKind::Extract(path.clone()))?;
        Ok(Resolution::Found(metadata))
    }
}
