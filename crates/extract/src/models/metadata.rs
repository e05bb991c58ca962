/// Descriptive fields resolved for one Cellar identifier.
///
/// Every field is a plain string so that any of them can be dropped into a
/// path mask. When a notice has no matching work/expression, the record is
/// built from [`Metadata::fallback`] instead: the file still gets copied, it
/// just lands under placeholder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Four-digit year from the creation date (may be empty if the date is malformed)
    pub year: String,
    /// Month from the creation date
    pub month: String,
    /// Day from the creation date
    pub day: String,
    /// Creation date as written in the notice, expected as `YYYY-MM-DD`
    pub date: String,
    /// Expression title, already sanitized for use as a path segment
    pub title: String,
    /// Expression subtitle, verbatim
    pub subtitle: String,
    /// Resource type IRI (`cdm:work_has_resource-type`)
    pub kind: String,
    /// European Legislation Identifier
    pub eli: String,
    /// CELEX number
    pub celex_identifier: String,
    /// Always present: the identifier the record was resolved for
    pub default_identifier: String,
}
impl Metadata {
    /// Names under which the fields are exposed to path masks.
    pub const FIELDS: [&'static str; 10] = [
        "year",
        "month",
        "day",
        "date",
        "title",
        "subtitle",
        "type",
        "eli",
        "celex_identifier",
        "default_identifier",
    ];

    /// Placeholder record used when a notice yields no result.
    pub fn fallback(identifier: impl Into<String>) -> Self {
        Self {
            year: "1970".to_string(),
            month: "01".to_string(),
            day: "01".to_string(),
            date: "1970-01-01".to_string(),
            title: "Untitled".to_string(),
            subtitle: String::new(),
            kind: "UNKNOWN".to_string(),
            eli: String::new(),
            celex_identifier: String::new(),
            default_identifier: identifier.into(),
        }
    }

    /// Looks up a field by its mask name (see [`FIELDS`](Self::FIELDS)).
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "year" => &self.year,
            "month" => &self.month,
            "day" => &self.day,
            "date" => &self.date,
            "title" => &self.title,
            "subtitle" => &self.subtitle,
            "type" => &self.kind,
            "eli" => &self.eli,
            "celex_identifier" => &self.celex_identifier,
            "default_identifier" => &self.default_identifier,
            _ => return None,
        };
        Some(value.as_str())
    }
}
impl AsRef<Metadata> for Metadata {
    fn as_ref(&self) -> &Metadata {
        self
    }
}
