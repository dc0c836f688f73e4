//! The fixed MIME ↔ short-name table.
//!
//! Short names double as the names of content capabilities (`json` →
//! `rest_content_json`), as the URL extension accepted by the content override
//! and as the CSV/XML serializer selectors.

use std::fmt;

/// A representation the dispatcher knows how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Html,
    Json,
    Xml,
    Rdf,
    Rss,
    Atom,
    Csv,
}

impl ContentType {
    /// Table order. Acceptable-type discovery iterates in this order.
    pub const ALL: [ContentType; 7] = [
        ContentType::Html,
        ContentType::Json,
        ContentType::Xml,
        ContentType::Rdf,
        ContentType::Rss,
        ContentType::Atom,
        ContentType::Csv,
    ];

    #[must_use]
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Json => "application/json",
            ContentType::Xml => "application/xml",
            ContentType::Rdf => "application/rdf+xml",
            ContentType::Rss => "application/rss+xml",
            ContentType::Atom => "application/atom+xml",
            ContentType::Csv => "application/vnd.ms-excel",
        }
    }

    #[must_use]
    pub fn short_name(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Json => "json",
            ContentType::Xml => "xml",
            ContentType::Rdf => "rdf",
            ContentType::Rss => "rss",
            ContentType::Atom => "atom",
            ContentType::Csv => "csv",
        }
    }

    /// Look up by MIME, ignoring parameters (`; charset=...`) and case.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::ALL
            .into_iter()
            .find(|t| t.mime().eq_ignore_ascii_case(essence))
    }

    #[must_use]
    pub fn from_short_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.short_name().eq_ignore_ascii_case(name))
    }

    /// Whether the representation is rendered by the XML serializer.
    #[must_use]
    pub fn is_xml_family(&self) -> bool {
        matches!(
            self,
            ContentType::Xml | ContentType::Rdf | ContentType::Rss | ContentType::Atom
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Short name for a request `Content-Type`, passing unknown values through.
#[must_use]
pub fn short_name_for(mime: &str) -> String {
    match ContentType::from_mime(mime) {
        Some(t) => t.short_name().to_string(),
        None => mime.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trip_names() {
        for t in ContentType::ALL {
            assert_eq!(ContentType::from_mime(t.mime()), Some(t));
            assert_eq!(ContentType::from_short_name(t.short_name()), Some(t));
        }
    }

    #[test]
    fn test_from_mime_ignores_parameters() {
        assert_eq!(
            ContentType::from_mime("application/json; charset=utf-8"),
            Some(ContentType::Json)
        );
        assert_eq!(ContentType::from_mime("text/plain"), None);
    }

    #[test]
    fn test_short_name_for_passes_unknown_through() {
        assert_eq!(short_name_for("application/vnd.ms-excel"), "csv");
        assert_eq!(short_name_for("text/plain"), "text/plain");
    }
}
