//! Path templating for archive organization.
//!
//! Converts [`Metadata`] into destination paths using two user-configured
//! masks: one for the folder, one for the file name. A mask is plain text with
//! `{field}` placeholders; `{{` and `}}` stand for literal braces. There is no
//! other syntax: no filters, no conditionals.
//!
//! # Template Fields
//!
//! | Field                | Description                                   | Fallback     |
//! |----------------------|-----------------------------------------------|--------------|
//! | `year`               | Year of the creation date                     | `1970`       |
//! | `month`              | Month of the creation date                    | `01`         |
//! | `day`                | Day of the creation date                      | `01`         |
//! | `date`               | Creation date as written (`YYYY-MM-DD`)       | `1970-01-01` |
//! | `title`              | Sanitized expression title                    | `Untitled`   |
//! | `subtitle`           | Expression subtitle                           | (empty)      |
//! | `type`               | Resource type IRI                             | `UNKNOWN`    |
//! | `eli`                | European Legislation Identifier               | (empty)      |
//! | `celex_identifier`   | CELEX number                                  | (empty)      |
//! | `default_identifier` | The item's identifier                         | n/a          |
//!
//! Unknown fields don't fail: they render as `[<name>NotFound]` so that a typo
//! shows up in the output instead of aborting the run.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use undump_extract::models::Metadata;
//! use undump_library::PathTemplate;
//!
//! let mut metadata = Metadata::fallback("U1");
//! metadata.year = "2020".to_string();
//! metadata.month = "05".to_string();
//! metadata.title = "Example_Title".to_string();
//!
//! let template = PathTemplate::new("{year}/{month}", "{title}").unwrap();
//! let path = template.destination(&metadata, Path::new("U1/pdf/doc.pdf")).unwrap();
//! assert_eq!(path, Path::new("2020/05/Example_Title.pdf"));
//! ```

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::instrument;
use undump_extract::FALLBACK_NAME;
use undump_extract::models::Metadata;
use undump_storage::validate_path;

pub const DEFAULT_FOLDER_MASK: &str = "{year}/{month}";
pub const DEFAULT_FILE_MASK: &str = "{title}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed mask, reusable across any number of [`render`](Self::render) calls.
///
/// Constructed via [`FromStr`] so that syntax errors (an unclosed `{`, a stray
/// `}`, an empty `{}`) surface once at startup rather than per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    source: String,
    segments: Vec<Segment>,
}
impl FromStr for Mask {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason: &str, at: usize| ErrorKind::InvalidMask(format!("{reason} at offset {at} in {s:?}"));
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = s.char_indices().peekable();
        while let Some((at, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, next)| next == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, next)| next == '}').is_some() => literal.push('}'),
                '}' => exn::bail!(invalid("unmatched `}`", at)),
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((inner, '{')) => exn::bail!(invalid("unexpected `{` inside placeholder", inner)),
                            Some((_, c)) => field.push(c),
                            None => exn::bail!(invalid("unclosed `{`", at)),
                        }
                    }
                    if field.is_empty() {
                        exn::bail!(invalid("empty placeholder", at));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                },
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { source: s.to_string(), segments })
    }
}
impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
impl Mask {
    /// Names of every placeholder, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder. Never fails.
    pub fn render(&self, metadata: &Metadata) -> String {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Field(name) => match metadata.get(name) {
                    Some(value) => rendered.push_str(value),
                    None => {
                        rendered.push('[');
                        rendered.push_str(name);
                        rendered.push_str("NotFound]");
                    },
                },
            }
        }
        rendered
    }
}

/// Generates destination paths (relative to the output root) from
/// [`Metadata`] and the source file being placed.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    folder: Mask,
    file: Mask,
}
impl Default for PathTemplate {
    fn default() -> Self {
        Self {
            folder: Mask {
                source: DEFAULT_FOLDER_MASK.to_string(),
                segments: vec![
                    Segment::Field("year".to_string()),
                    Segment::Literal("/".to_string()),
                    Segment::Field("month".to_string()),
                ],
            },
            file: Mask {
                source: DEFAULT_FILE_MASK.to_string(),
                segments: vec![Segment::Field("title".to_string())],
            },
        }
    }
}
impl PathTemplate {
    /// Parses both masks. Placeholders naming no known field are logged once
    /// here; they still render as `[<name>NotFound]`.
    ///
    /// # Errors
    /// [`ErrorKind::InvalidMask`] if either mask doesn't parse.
    pub fn new(folder: &str, file: &str) -> Result<Self> {
        let template = Self { folder: folder.parse()?, file: file.parse()? };
        for field in template.unknown_fields() {
            tracing::warn!(field, "Unknown template field");
        }
        Ok(template)
    }

    /// Placeholders in either mask that no [`Metadata`] record can fill.
    pub fn unknown_fields(&self) -> impl Iterator<Item = &str> {
        self.folder
            .fields()
            .chain(self.file.fields())
            .filter(|field| !Metadata::FIELDS.iter().any(|known| known == field))
    }

    pub fn folder_mask(&self) -> &Mask {
        &self.folder
    }

    pub fn file_mask(&self) -> &Mask {
        &self.file
    }

    /// Renders the folder mask into a directory relative to the output root.
    ///
    /// Leading/trailing `/` and `\` are stripped and the rest is split on `/`,
    /// dropping empty and `.` components. An empty result is the output root
    /// itself. Rendered values are *not* sanitized, so a `..` that would climb
    /// out of the output root is an [`ErrorKind::Template`] error.
    pub fn folder(&self, metadata: &Metadata) -> Result<PathBuf> {
        let rendered = self.folder.render(metadata);
        let parts: Vec<&str> =
            rendered.trim_matches(['/', '\\']).split('/').filter(|part| !part.is_empty() && *part != ".").collect();
        if parts.is_empty() {
            return Ok(PathBuf::new());
        }
        validate_path(parts.join("/")).or_raise(|| ErrorKind::Template)
    }

    /// Renders the file mask into a single file name, keeping `source`'s extension.
    ///
    /// The rendered name is trimmed and path separators in it become `_`. If
    /// nothing usable is left, the record's `default_identifier` is used, then
    /// the source file's own stem.
    pub fn file_name(&self, metadata: &Metadata, source: &Path) -> OsString {
        let rendered = self.file.render(metadata);
        let mut name = [rendered.trim(), metadata.default_identifier.trim()]
            .into_iter()
            .map(|candidate| candidate.replace(['/', '\\'], "_"))
            .find(|candidate| !matches!(candidate.as_str(), "" | "." | ".."))
            .map(OsString::from)
            .or_else(|| source.file_stem().filter(|stem| !stem.is_empty()).map(OsStr::to_os_string))
            .unwrap_or_else(|| OsString::from(FALLBACK_NAME));
        if let Some(extension) = source.extension().filter(|extension| !extension.is_empty()) {
            name.push(".");
            name.push(extension);
        }
        name
    }

    /// Renders the full destination path, relative to the output root.
    #[instrument(skip_all, fields(identifier = %metadata.default_identifier))]
    pub fn destination(&self, metadata: &Metadata, source: &Path) -> Result<PathBuf> {
        let path = self.folder(metadata)?.join(self.file_name(metadata, source));
        validate_path(&path).or_raise(|| ErrorKind::Template)
    }
}
