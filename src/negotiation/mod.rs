//! # Header Negotiator
//!
//! The dispatcher never parses preference headers itself. It hands the
//! server-supported candidates to a [`HeaderNegotiator`] and gets back either the
//! best candidate or `None`, the definite "no match" signal that becomes a
//! `406 Not Acceptable`.
//!
//! [`RequestNegotiator`] is the default implementation over the request's
//! `Accept`, `Accept-Charset` and `Accept-Language` headers. An absent (or empty)
//! header accepts anything, so the first candidate wins.
//!
//! ```rust
//! use brrtrest::negotiation::{HeaderNegotiator, RequestNegotiator};
//!
//! let n = RequestNegotiator::new(Some("application/xml;q=0.5, application/json"), None, None);
//! let supported = vec!["application/xml".to_string(), "application/json".to_string()];
//! assert_eq!(n.preferred_accept(&supported).as_deref(), Some("application/json"));
//! ```

mod quality;

pub use quality::{best_candidate, QualityItem, QualityList};

use crate::server::RestRequest;

/// Picks the best server-supported value for each negotiated dimension.
pub trait HeaderNegotiator {
    /// Best MIME type among `candidates`, `None` when the client accepts none.
    fn preferred_accept(&self, candidates: &[String]) -> Option<String>;
    /// Best charset among `candidates`.
    fn preferred_charset(&self, candidates: &[String]) -> Option<String>;
    /// Best language tag among `candidates`.
    fn preferred_language(&self, candidates: &[String]) -> Option<String>;
}

/// Negotiator over the three preference headers of a request.
#[derive(Debug, Clone, Default)]
pub struct RequestNegotiator {
    accept: Option<QualityList>,
    charset: Option<QualityList>,
    language: Option<QualityList>,
}

fn parse_header(value: Option<&str>) -> Option<QualityList> {
    value
        .map(QualityList::parse)
        .filter(|list| !list.is_empty())
}

impl RequestNegotiator {
    #[must_use]
    pub fn new(
        accept: Option<&str>,
        accept_charset: Option<&str>,
        accept_language: Option<&str>,
    ) -> Self {
        Self {
            accept: parse_header(accept),
            charset: parse_header(accept_charset),
            language: parse_header(accept_language),
        }
    }

    #[must_use]
    pub fn from_request(req: &RestRequest) -> Self {
        Self::new(
            req.get_header("accept"),
            req.get_header("accept-charset"),
            req.get_header("accept-language"),
        )
    }
}

/// Rank of a media range against a concrete MIME: exact 3, `type/*` 2, `*/*` 1.
fn media_range_rank(range: &str, mime: &str) -> Option<usize> {
    let (rt, rs) = range.split_once('/')?;
    let (mt, ms) = mime.split_once('/')?;
    match (rt, rs) {
        ("*", "*") => Some(1),
        (t, "*") if t.eq_ignore_ascii_case(mt) => Some(2),
        (t, s) if t.eq_ignore_ascii_case(mt) && s.eq_ignore_ascii_case(ms) => Some(3),
        _ => None,
    }
}

/// Rank of a charset entry: exact 2, `*` 1.
fn charset_rank(range: &str, charset: &str) -> Option<usize> {
    if range == "*" {
        Some(1)
    } else if range.eq_ignore_ascii_case(charset) {
        Some(2)
    } else {
        None
    }
}

/// Basic language-range filtering: the range equals the tag or is a
/// `-`-delimited prefix of it. Longer ranges rank higher; `*` ranks lowest.
fn language_rank(range: &str, tag: &str) -> Option<usize> {
    if range == "*" {
        return Some(1);
    }
    let tag = tag.to_ascii_lowercase();
    if tag == range {
        return Some(range.len() + 1);
    }
    match tag.strip_prefix(range) {
        Some(rest) if rest.starts_with('-') => Some(range.len() + 1),
        _ => None,
    }
}

impl HeaderNegotiator for RequestNegotiator {
    fn preferred_accept(&self, candidates: &[String]) -> Option<String> {
        match &self.accept {
            None => candidates.first().cloned(),
            Some(list) => best_candidate(candidates, |mime| {
                list.quality_of(|range| media_range_rank(range, mime))
            }),
        }
    }

    fn preferred_charset(&self, candidates: &[String]) -> Option<String> {
        match &self.charset {
            None => candidates.first().cloned(),
            Some(list) => best_candidate(candidates, |cs| {
                list.quality_of(|range| charset_rank(range, cs))
            }),
        }
    }

    fn preferred_language(&self, candidates: &[String]) -> Option<String> {
        match &self.language {
            None => candidates.first().cloned(),
            Some(list) => best_candidate(candidates, |tag| {
                list.quality_of(|range| language_rank(range, tag))
            }),
        }
    }
}
