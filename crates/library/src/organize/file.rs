use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::conflict::copy_unique;
use crate::organize::error::{ErrorKind as OrganizeErrorKind, Result as OrganizeResult};
use crate::resolve::Resolution;
use crate::scan::ArchiveItem;
use exn::ResultExt;
use std::path::PathBuf;
use tracing::instrument;
use undump_storage::LocalBackend;

/// The outcome of (successfully) handling a single archive item.
///
/// Paths are absolute. Consumers can pattern-match to decide what to log or
/// count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The file was copied to its rendered destination.
    Copied { source: PathBuf, destination: PathBuf },
    /// The rendered destination was taken; the file was copied next to it
    /// under a disambiguated name instead.
    Disambiguated { source: PathBuf, intended: PathBuf, destination: PathBuf },
    /// The file was left alone.
    Skipped { source: PathBuf, reason: SkipReason },
}
impl Action {
    pub fn source(&self) -> &PathBuf {
        match self {
            Self::Copied { source, .. } | Self::Disambiguated { source, .. } | Self::Skipped { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No identifier could be derived from the item's path.
    NoIdentifier,
    /// The identifier has no metadata document.
    NoMetadata { expected: PathBuf },
}

/// Resolves, renders and copies a single item into `output`.
///
/// - **[`Action::Skipped`]**: the item has no identifier, or its identifier
///   has no metadata document. Nothing is written.
/// - **[`Action::Copied`]**: the file landed at the destination rendered from
///   its metadata (placeholder metadata if the notice had no match).
/// - **[`Action::Disambiguated`]**: that destination was already taken.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Organize>`](LibraryErrorKind::Organize), naming the source file,
/// raised from an inner [`Exn<OrganizeErrorKind>`](OrganizeErrorKind).
pub fn organize_file(output: &LocalBackend, ctx: &Context, item: &ArchiveItem) -> LibraryResult<Action> {
    organize_file_inner(output, ctx, item).or_raise(|| LibraryErrorKind::Organize(item.source.clone()))
}

#[instrument(skip_all, fields(path = %item.relative.display()))]
fn organize_file_inner(output: &LocalBackend, ctx: &Context, item: &ArchiveItem) -> OrganizeResult<Action> {
    let source = item.source.clone();
    tracing::debug!(
        folder_mask = %ctx.template.folder_mask(),
        file_mask = %ctx.template.file_mask(),
        "Applying folder and file masks"
    );
    let Some(identifier) = item.identifier.as_deref() else {
        tracing::warn!(path = %source.display(), "Could not determine identifier");
        return Ok(Action::Skipped { source, reason: SkipReason::NoIdentifier });
    };
    tracing::debug!(identifier, "Found identifier");

    let metadata = match ctx.resolver.resolve(identifier, &ctx.language).or_raise(|| OrganizeErrorKind::Metadata)? {
        Resolution::Found(metadata) => metadata,
        Resolution::Missing { expected } => {
            tracing::warn!(path = %source.display(), expected = %expected.display(), "No metadata document");
            return Ok(Action::Skipped { source, reason: SkipReason::NoMetadata { expected } });
        },
    };
    tracing::debug!(?metadata, "Resolved metadata");

    let intended = ctx.template.destination(&metadata, &item.relative).or_raise(|| OrganizeErrorKind::Template)?;
    let destination = copy_unique(output, &source, &intended, identifier)?;
    let action = match destination == intended {
        true => Action::Copied { source, destination: output.root().join(destination) },
        false => Action::Disambiguated {
            source,
            intended: output.root().join(intended),
            destination: output.root().join(destination),
        },
    };
    tracing::debug!(?action, "Copied");
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathTemplate;
    use crate::resolve::error::{ErrorKind as ResolveErrorKind, Result as ResolveResult};
    use crate::resolve::{CellarResolver, MetadataResolver};
    use crate::testing::{Fixture, NoticeFixture};
    use std::fs;
    use std::ops::Deref;
    use undump_extract::models::Metadata;
    use undump_storage::FileInfo;

    fn item(fixture: &Fixture, relative: &str) -> ArchiveItem {
        let size = fs::metadata(fixture.archive.path().join(relative)).unwrap().len();
        ArchiveItem::new(fixture.archive.path(), FileInfo::new(relative, size))
    }

    #[test]
    fn test_copies_to_rendered_destination() {
        let fixture = Fixture::new();
        fixture.source("U1/pdf/doc.pdf", "pdf bytes");
        fixture.notice(&NoticeFixture::new("U1", "2020-05-17", "Example Title"));

        let action = organize_file(&fixture.output(), &fixture.context(), &item(&fixture, "U1/pdf/doc.pdf")).unwrap();
        let destination = fixture.output.path().join("2020/05/Example_Title.pdf");
        assert_eq!(
            action,
            Action::Copied { source: fixture.archive.path().join("U1/pdf/doc.pdf"), destination: destination.clone() }
        );
        assert_eq!(fs::read_to_string(destination).unwrap(), "pdf bytes");
    }

    #[test]
    fn test_unmatched_notice_uses_placeholders() {
        let fixture = Fixture::new();
        fixture.source("U1/doc.html", "html");
        fixture.notice(&NoticeFixture::new("U1", "2020-05-17", "Example Title").with_language("FRA"));

        let action = organize_file(&fixture.output(), &fixture.context(), &item(&fixture, "U1/doc.html")).unwrap();
        assert!(matches!(action, Action::Copied { .. }));
        assert!(fixture.output.path().join("1970/01/Untitled.html").is_file());
    }

    #[test]
    fn test_missing_notice_is_skipped() {
        let fixture = Fixture::new();
        fixture.source("U1/doc.pdf", "pdf");

        let action = organize_file(&fixture.output(), &fixture.context(), &item(&fixture, "U1/doc.pdf")).unwrap();
        let expected = fixture.metadata.path().join("U1/tree_non_inferred.rdf");
        assert_eq!(action.source(), &fixture.archive.path().join("U1/doc.pdf"));
        assert!(matches!(
            action,
            Action::Skipped { reason: SkipReason::NoMetadata { expected: e }, .. } if e == expected
        ));
        assert!(fixture.output().list().unwrap().is_empty());
    }

    #[test]
    fn test_no_identifier_is_skipped() {
        let fixture = Fixture::new();
        let item = ArchiveItem {
            source: PathBuf::from("/elsewhere/doc.pdf"),
            relative: PathBuf::from("../doc.pdf"),
            identifier: None,
            size: 0,
        };
        let action = organize_file(&fixture.output(), &fixture.context(), &item).unwrap();
        assert!(matches!(action, Action::Skipped { reason: SkipReason::NoIdentifier, .. }));
    }

    #[test]
    fn test_collision_is_disambiguated() {
        let fixture = Fixture::new();
        fixture.source("U1/doc.pdf", "first");
        fixture.source("U2/doc.pdf", "second");
        fixture.notice(&NoticeFixture::new("U1", "2020-05-17", "Example Title"));
        fixture.notice(&NoticeFixture::new("U2", "2020-05-01", "Example Title"));
        let (output, ctx) = (fixture.output(), fixture.context());

        organize_file(&output, &ctx, &item(&fixture, "U1/doc.pdf")).unwrap();
        let action = organize_file(&output, &ctx, &item(&fixture, "U2/doc.pdf")).unwrap();
        let month = fixture.output.path().join("2020/05");
        assert_eq!(
            action,
            Action::Disambiguated {
                source: fixture.archive.path().join("U2/doc.pdf"),
                intended: month.join("Example_Title.pdf"),
                destination: month.join("Example_Title_U2_1.pdf"),
            }
        );
        assert_eq!(fs::read_to_string(month.join("Example_Title.pdf")).unwrap(), "first");
        assert_eq!(fs::read_to_string(month.join("Example_Title_U2_1.pdf")).unwrap(), "second");
    }

    #[test]
    fn test_escaping_template_is_an_error() {
        let fixture = Fixture::new();
        fixture.source("U1/doc.pdf", "pdf");
        fixture.notice(&NoticeFixture::new("U1", "2020-05-17", "Example Title"));
        let mut ctx = fixture.context();
        ctx.template = PathTemplate::new("../../{year}", "{title}").unwrap();

        let err = organize_file_inner(&fixture.output(), &ctx, &item(&fixture, "U1/doc.pdf")).unwrap_err();
        assert_eq!(err.deref(), &OrganizeErrorKind::Template);
        let err = organize_file(&fixture.output(), &ctx, &item(&fixture, "U1/doc.pdf")).unwrap_err();
        assert_eq!(err.deref(), &LibraryErrorKind::Organize(fixture.archive.path().join("U1/doc.pdf")));
    }

    struct BrokenResolver;
    impl MetadataResolver for BrokenResolver {
        fn resolve(&self, _identifier: &str, _language: &str) -> ResolveResult<Resolution> {
            exn::bail!(ResolveErrorKind::Io(PathBuf::from("broken.rdf")))
        }
    }

    #[test]
    fn test_resolver_failure_is_an_error() {
        let fixture = Fixture::new();
        fixture.source("U1/doc.pdf", "pdf");
        let mut ctx = fixture.context();
        ctx.resolver = Box::new(BrokenResolver);

        let err = organize_file_inner(&fixture.output(), &ctx, &item(&fixture, "U1/doc.pdf")).unwrap_err();
        assert_eq!(err.deref(), &OrganizeErrorKind::Metadata);
    }

    struct StaticResolver(Metadata);
    impl MetadataResolver for StaticResolver {
        fn resolve(&self, _identifier: &str, _language: &str) -> ResolveResult<Resolution> {
            Ok(Resolution::Found(self.0.clone()))
        }
    }

    #[test]
    fn test_any_resolver_can_be_plugged_in() {
        let fixture = Fixture::new();
        fixture.source("U9/doc.pdf", "pdf");
        let mut metadata = Metadata::fallback("U9");
        metadata.celex_identifier = "32016R0679".to_string();
        let mut ctx = fixture.context();
        ctx.resolver = Box::new(StaticResolver(metadata));
        ctx.template = PathTemplate::new("", "{celex_identifier}").unwrap();

        organize_file(&fixture.output(), &ctx, &item(&fixture, "U9/doc.pdf")).unwrap();
        assert!(fixture.output.path().join("32016R0679.pdf").is_file());
        // The Cellar resolver would have skipped it: there is no notice.
        let cellar = CellarResolver::new(fixture.metadata.path());
        assert!(matches!(cellar.resolve("U9", "ENG").unwrap(), Resolution::Missing { .. }));
    }
}
