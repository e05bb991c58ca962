//! In-memory triple store.
//!
//! Notices are small (a few hundred triples) so a flat, insertion-ordered
//! vector with linear pattern matching is all that's needed. Insertion order
//! is document order, which is what makes "first match" lookups deterministic.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// A literal value with its optional language tag or datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: String,
    pub language: Option<String>,
    pub datatype: Option<String>,
}

/// An RDF term in subject or object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
}
impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::Blank(id.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(Literal { value: value.into(), language: None, datatype: None })
    }

    /// The lexical form of the term: the IRI, the blank node label, or the
    /// literal's value without language tag or datatype.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::Blank(id) => id,
            Self::Literal(literal) => &literal.value,
        }
    }
}
impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: Term,
    /// Predicates are always IRIs.
    pub predicate: String,
    pub object: Term,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
}
impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: Term, predicate: impl Into<String>, object: Term) {
        self.triples.push(Triple { subject, predicate: predicate.into(), object });
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// All triples matching the pattern, where `None` is a wildcard.
    pub fn matching<'g, 'q>(
        &'g self,
        subject: Option<&'q Term>,
        predicate: Option<&'q str>,
        object: Option<&'q Term>,
    ) -> impl Iterator<Item = &'g Triple> + 'q
    where
        'g: 'q,
    {
        self.triples.iter().filter(move |t| {
            subject.is_none_or(|s| &t.subject == s)
                && predicate.is_none_or(|p| t.predicate == p)
                && object.is_none_or(|o| &t.object == o)
        })
    }

    pub fn objects<'g, 'q>(&'g self, subject: &'q Term, predicate: &'q str) -> impl Iterator<Item = &'g Term> + 'q
    where
        'g: 'q,
    {
        self.matching(Some(subject), Some(predicate), None).map(|t| &t.object)
    }

    pub fn subjects<'g, 'q>(&'g self, predicate: &'q str, object: &'q Term) -> impl Iterator<Item = &'g Term> + 'q
    where
        'g: 'q,
    {
        self.matching(None, Some(predicate), Some(object)).map(|t| &t.subject)
    }

    /// The first object (in document order) for `subject` and `predicate`.
    pub fn object<'g>(&'g self, subject: &Term, predicate: &str) -> Option<&'g Term> {
        self.triples.iter().find(|t| &t.subject == subject && t.predicate == predicate).map(|t| &t.object)
    }

    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.matching(Some(subject), Some(predicate), Some(object)).next().is_some()
    }
}
