//! The Cellar work/expression lookup.

use crate::consts;
use crate::error::Result;
use crate::graph::{Graph, Term};
use crate::models::Metadata;
use crate::rdfxml;
use crate::slug::slugify;
use tracing::instrument;

/// The terms bound by one successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub work: &'a Term,
    pub expression: &'a Term,
    pub date: &'a Term,
    pub eli: &'a Term,
    pub kind: &'a Term,
    pub celex_identifier: &'a Term,
    pub legal_year: &'a Term,
    pub title: &'a Term,
    pub subtitle: &'a Term,
}

#[derive(Debug)]
pub struct Extractor {
    graph: Graph,
}
impl Extractor {
    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn from_rdf_xml(rdf: impl AsRef<[u8]>) -> Result<Self> {
        Ok(Self::from_graph(rdfxml::parse(rdf)?))
    }

    /// Finds the first work declared `owl:sameAs` the Cellar resource for
    /// `identifier` that carries a creation date, ELI, resource type, CELEX
    /// number and legal year, together with its first expression in
    /// `language` (a three-letter authority code such as `ENG`) that has both
    /// a title and subtitle.
    ///
    /// Candidates are explored in document order, so the returned row is the
    /// same one a nested-loop join over the notice would produce first.
    pub fn lookup(&self, identifier: &str, language: &str) -> Option<Row<'_>> {
        let graph = &self.graph;
        let root = Term::iri(format!("{}{identifier}", consts::CELLAR_RESOURCE));
        let language = Term::iri(format!("{}{language}", consts::LANGUAGE_AUTHORITY));
        for work in graph.objects(&root, consts::OWL_SAME_AS) {
            // Each work-level pattern is independent of the others, so the
            // first value of each is the first combination.
            let (Some(date), Some(eli), Some(kind), Some(celex_identifier), Some(legal_year)) = (
                graph.object(work, consts::DATE_CREATION_LEGACY),
                graph.object(work, consts::RESOURCE_LEGAL_ELI),
                graph.object(work, consts::WORK_HAS_RESOURCE_TYPE),
                graph.object(work, consts::RESOURCE_LEGAL_ID_CELEX),
                graph.object(work, consts::RESOURCE_LEGAL_YEAR),
            ) else {
                continue;
            };
            let expressions = graph
                .subjects(consts::EXPRESSION_BELONGS_TO_WORK, work)
                .filter(|expression| graph.contains(expression, consts::EXPRESSION_USES_LANGUAGE, &language));
            for expression in expressions {
                if let (Some(title), Some(subtitle)) = (
                    graph.object(expression, consts::EXPRESSION_TITLE),
                    graph.object(expression, consts::EXPRESSION_SUBTITLE),
                ) {
                    return Some(Row {
                        work,
                        expression,
                        date,
                        eli,
                        kind,
                        celex_identifier,
                        legal_year,
                        title,
                        subtitle,
                    });
                }
            }
        }
        None
    }

    /// Resolves the [`Metadata`] record for `identifier`, falling back to
    /// [`Metadata::fallback`] when the lookup finds nothing.
    ///
    /// The title is sanitized with [`slugify`] to at most `max_len` characters.
    #[instrument(skip(self))]
    pub fn metadata(&self, identifier: &str, language: &str, max_len: usize) -> Metadata {
        let Some(row) = self.lookup(identifier, language) else {
            tracing::debug!("No work/expression matched, using placeholder metadata");
            return Metadata::fallback(identifier);
        };
        let date = row.date.to_string();
        let (year, month, day) = split_date(&date);
        Metadata {
            year,
            month,
            day,
            title: slugify(row.title.as_str(), max_len),
            subtitle: row.subtitle.to_string(),
            kind: row.kind.to_string(),
            eli: row.eli.to_string(),
            celex_identifier: row.celex_identifier.to_string(),
            default_identifier: identifier.to_string(),
            date,
        }
    }
}

/// Splits a `YYYY-MM-DD` date into its components. Anything that doesn't
/// have exactly three dash-separated parts yields three empty strings.
fn split_date(date: &str) -> (String, String, String) {
    let mut parts = date.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(day), None) => (year.to_string(), month.to_string(), day.to_string()),
        _ => Default::default(),
    }
}
