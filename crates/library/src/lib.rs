pub mod error;
pub mod organize;
pub mod resolve;
pub mod scan;
mod template;

pub use crate::resolve::{CellarResolver, MetadataResolver, Resolution};
pub use crate::template::{DEFAULT_FILE_MASK, DEFAULT_FOLDER_MASK, Mask, PathTemplate};

/// Everything [`organize`](crate::organize::organize) needs besides the
/// archive and output roots.
pub struct Context {
    pub template: PathTemplate,
    pub resolver: Box<dyn MetadataResolver>,
    /// Three-letter language code, e.g. `ENG`
    pub language: String,
    /// Only process the first N files (in path order)
    pub limit: Option<usize>,
}
impl Context {
    pub fn new(template: PathTemplate, resolver: impl MetadataResolver + 'static, language: impl Into<String>) -> Self {
        Self { template, resolver: Box::new(resolver), language: language.into(), limit: None }
    }

    pub fn with_limit(mut self, limit: impl Into<Option<usize>>) -> Self {
        self.limit = limit.into();
        self
    }
}
