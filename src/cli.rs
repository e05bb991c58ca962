//! Command line for undump.

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser};
use exn::ResultExt;
use std::ops::Deref;
use std::path::PathBuf;
use undump_config::{Config, Overrides};
use undump_library::error::ErrorKind as LibraryErrorKind;
use undump_library::organize::{Action, OrganizeEvent, organize};
use undump_library::{CellarResolver, Context, PathTemplate};
use undump_storage::LocalBackend;

const FIELDS_HELP: &str = "\
Template fields (use as {field} in either mask; {{ and }} are literal braces):
  year, month, day       components of the creation date
  date                   creation date, YYYY-MM-DD
  title                  sanitized expression title
  subtitle               expression subtitle
  type                   resource type IRI
  eli                    European Legislation Identifier
  celex_identifier       CELEX number
  default_identifier     the item's identifier

Unknown fields render as [<field>NotFound].";

/// Reorganise a Cellar archive dump into a clean collection using RDF metadata.
///
/// Every file below ARCHIVE_DIR is looked up by its identifier (the first
/// directory below ARCHIVE_DIR) in METADATA_DIR/<identifier>/, and copied into
/// OUTPUT_DIR at a path rendered from the folder and file masks.
#[derive(Debug, Parser)]
#[command(name = "undump", version, after_help = FIELDS_HELP)]
pub struct Cli {
    /// Root of the archive dump, one directory per identifier
    #[arg(value_parser = existing_dir)]
    pub archive_dir: PathBuf,
    /// Destination of the organized tree (created if missing)
    pub output_dir: PathBuf,
    /// Root of the metadata dump, one directory per identifier
    #[arg(value_parser = existing_dir)]
    pub metadata_dir: PathBuf,
    /// Mask for the destination folder [default: {year}/{month}]
    #[arg(long, value_name = "MASK")]
    pub folder_mask: Option<String>,
    /// Mask for the destination file name, without extension [default: {title}]
    #[arg(long, value_name = "MASK")]
    pub file_mask: Option<String>,
    /// Only process the first N files in path order (0 processes everything)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
    /// Language of the expression to take titles from [default: ENG]
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,
    /// Configuration file (TOML, YAML or JSON) to load instead of the user's
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log more: -v for progress, -vv for every step
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn existing_dir(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    match path.is_dir() {
        true => Ok(path),
        false => Err(format!("`{value}` is not an existing directory")),
    }
}

/// Outcome counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub copied: u64,
    pub disambiguated: u64,
    pub skipped: u64,
    pub failed: u64,
}
impl Summary {
    fn record(&mut self, action: &Action) {
        match action {
            Action::Copied { source, destination } => {
                tracing::info!(source = %source.display(), destination = %destination.display(), "Copied");
                self.copied += 1;
            },
            Action::Disambiguated { source, destination, .. } => {
                tracing::info!(source = %source.display(), destination = %destination.display(), "Copied (renamed)");
                self.disambiguated += 1;
            },
            Action::Skipped { .. } => self.skipped += 1,
        }
    }
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            folder_mask: self.folder_mask.clone(),
            file_mask: self.file_mask.clone(),
            language: self.language.clone(),
            limit: self.limit,
        }
    }

    /// Loads configuration, then organizes the whole archive.
    ///
    /// Only setup problems are errors. Files that fail are logged and counted
    /// in the returned [`Summary`].
    pub fn run(&self) -> Result<Summary> {
        let config = Config::load(self.config.as_deref(), &self.overrides()).or_raise(|| ErrorKind::Config)?;
        tracing::debug!(?config, "Loaded configuration");
        let template = PathTemplate::new(&config.folder_mask, &config.file_mask).or_raise(|| ErrorKind::Template)?;
        let archive = LocalBackend::open(&self.archive_dir).or_raise(|| ErrorKind::Archive)?;
        let output = LocalBackend::new(&self.output_dir).or_raise(|| ErrorKind::Output)?;
        let resolver = CellarResolver::new(&self.metadata_dir)
            .with_filename(&config.rdf_filename)
            .with_max_segment_len(config.max_segment_len);
        let ctx = Context::new(template, resolver, &config.language).with_limit(config.limit);

        let mut summary = Summary::default();
        for event in organize(&archive, &output, &ctx) {
            match event {
                Ok(OrganizeEvent::Started) => tracing::debug!(
                    archive = %archive.root().display(),
                    output = %output.root().display(),
                    "Started"
                ),
                Ok(OrganizeEvent::DiscoveryComplete(total)) => tracing::debug!(total, "Discovered files"),
                Ok(OrganizeEvent::Organized(action)) => summary.record(&action),
                Ok(OrganizeEvent::Complete) => {},
                Err(e) if matches!(e.deref(), LibraryErrorKind::Scan) => {
                    return Err(e).or_raise(|| ErrorKind::Archive);
                },
                Err(e) => {
                    tracing::error!(error = ?e, "{e}");
                    summary.failed += 1;
                },
            }
        }
        Ok(summary)
    }
}
