//! Layered configuration for undump.
//!
//! Values are merged from, lowest precedence first:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a configuration file: either the one passed explicitly, or
//!    `config.{toml,yaml,yml,json}` in the user's configuration directory,
//! 3. `UNDUMP_`-prefixed environment variables (`UNDUMP_FILE_MASK`, ...),
//! 4. command-line [`Overrides`].
//!
//! ```toml
//! folder_mask = "{year}/{type}"
//! file_mask = "{celex_identifier}"
//! language = "FRA"
//! max_segment_len = 60
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const ENV_PREFIX: &str = "UNDUMP_";
/// Shortest segment length that still fits the sanitizer's `unnamed` fallback.
pub const MIN_SEGMENT_LEN: usize = 7;
const FILE_STEM: &str = "config";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mask for the destination directory below the output root
    pub folder_mask: String,
    /// Mask for the destination file name (the source extension is appended)
    pub file_mask: String,
    /// Three-letter language code of the expression to take titles from
    pub language: String,
    /// Only process the first N files (in path order)
    pub limit: Option<usize>,
    /// Name of the RDF/XML notice in each `<metadata root>/<identifier>/` directory
    pub rdf_filename: String,
    /// Maximum length of a sanitized title
    pub max_segment_len: usize,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            folder_mask: "{year}/{month}".to_string(),
            file_mask: "{title}".to_string(),
            language: "ENG".to_string(),
            limit: None,
            rdf_filename: "tree_non_inferred.rdf".to_string(),
            max_segment_len: 30,
        }
    }
}

/// Values given on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_mask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Config {
    /// Loads the full stack of configuration layers.
    ///
    /// An explicit `file` must exist. Without one, the user's configuration
    /// file is used if there is one.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match file {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            None => user_config_file(),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file found, using defaults"),
        }
        Self::from_figment(Self::figment(file.as_deref(), overrides)?)
    }

    /// Builds the merged (but not yet extracted) provider stack.
    pub fn figment(file: Option<&Path>, overrides: &Overrides) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::Invalid(format!(
                    "unsupported configuration format: {}",
                    path.display()
                ))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::defaults(overrides)))
    }

    /// Extracts and validates a [`Config`] from a provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment.extract::<Self>().or_raise(|| ErrorKind::Load)?.validate()
    }

    fn validate(mut self) -> Result<Self> {
        if self.language.is_empty() || !self.language.chars().all(|c| c.is_ascii_alphanumeric()) {
            exn::bail!(ErrorKind::Invalid(format!("language must be a code like ENG, got {:?}", self.language)));
        }
        self.language.make_ascii_uppercase();
        let mut components = Path::new(&self.rdf_filename).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            exn::bail!(ErrorKind::Invalid(format!(
                "rdf_filename must be a plain file name, got {:?}",
                self.rdf_filename
            )));
        }
        if self.max_segment_len < MIN_SEGMENT_LEN {
            exn::bail!(ErrorKind::Invalid(format!(
                "max_segment_len must be at least {MIN_SEGMENT_LEN}, got {}",
                self.max_segment_len
            )));
        }
        // Zero has always meant "everything".
        self.limit = self.limit.filter(|&limit| limit > 0);
        Ok(self)
    }
}

/// The first `config.*` file in the user's configuration directory, if any.
pub fn user_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "undump")?;
    ["toml", "yaml", "yml", "json"]
        .iter()
        .map(|extension| dirs.config_dir().join(FILE_STEM).with_extension(extension))
        .find(|path| path.is_file())
}
