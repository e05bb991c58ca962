use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Every Cellar identifier is a path segment under this IRI.
pub const CELLAR_RESOURCE: &str = "http://publications.europa.eu/resource/cellar/";
/// Language authority table; three-letter codes are appended (`ENG`, `FRA`...).
pub const LANGUAGE_AUTHORITY: &str = "http://publications.europa.eu/resource/authority/language/";

macro_rules! cdm {
    ($name:ident, $local:literal) => {
        pub const $name: &str = concat!("http://publications.europa.eu/ontology/cdm#", $local);
    };
}

// Work properties
cdm!(DATE_CREATION_LEGACY, "date_creation_legacy");
cdm!(RESOURCE_LEGAL_ELI, "resource_legal_eli");
cdm!(WORK_HAS_RESOURCE_TYPE, "work_has_resource-type");
cdm!(RESOURCE_LEGAL_ID_CELEX, "resource_legal_id_celex");
cdm!(RESOURCE_LEGAL_YEAR, "resource_legal_year");
// Expression properties
cdm!(EXPRESSION_BELONGS_TO_WORK, "expression_belongs_to_work");
cdm!(EXPRESSION_USES_LANGUAGE, "expression_uses_language");
cdm!(EXPRESSION_TITLE, "expression_title");
cdm!(EXPRESSION_SUBTITLE, "expression_subtitle");

// Runs of anything that isn't safe in a single path segment.
regex!(UNSAFE_CHARS_REGEX, r"[^A-Za-z0-9._-]+");
