//! HTTP verbs understood by the dispatcher.
//!
//! The dispatcher works with a closed set of eight verbs. A resource declares the
//! subset it answers as a [`MethodSet`], a small bitmask that is cheap to copy
//! into the per-request context.

use std::fmt;
use std::str::FromStr;

/// One of the eight verbs a resource may answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RestMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
    Trace,
    Patch,
    Options,
}

impl RestMethod {
    /// Every verb in canonical probing order.
    pub const ALL: [RestMethod; 8] = [
        RestMethod::Get,
        RestMethod::Put,
        RestMethod::Post,
        RestMethod::Delete,
        RestMethod::Head,
        RestMethod::Trace,
        RestMethod::Patch,
        RestMethod::Options,
    ];

    /// Upper-case wire name (`GET`, `PUT`, ...)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RestMethod::Get => "GET",
            RestMethod::Put => "PUT",
            RestMethod::Post => "POST",
            RestMethod::Delete => "DELETE",
            RestMethod::Head => "HEAD",
            RestMethod::Trace => "TRACE",
            RestMethod::Patch => "PATCH",
            RestMethod::Options => "OPTIONS",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not one of the eight verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method '{0}'")]
pub struct UnknownMethod(pub String);

impl FromStr for RestMethod {
    type Err = UnknownMethod;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RestMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownMethod(trimmed.to_string()))
    }
}

impl From<RestMethod> for http::Method {
    fn from(m: RestMethod) -> Self {
        match m {
            RestMethod::Get => http::Method::GET,
            RestMethod::Put => http::Method::PUT,
            RestMethod::Post => http::Method::POST,
            RestMethod::Delete => http::Method::DELETE,
            RestMethod::Head => http::Method::HEAD,
            RestMethod::Trace => http::Method::TRACE,
            RestMethod::Patch => http::Method::PATCH,
            RestMethod::Options => http::Method::OPTIONS,
        }
    }
}

impl TryFrom<&http::Method> for RestMethod {
    type Error = UnknownMethod;

    fn try_from(m: &http::Method) -> Result<Self, Self::Error> {
        m.as_str().parse()
    }
}

/// Bitmask of [`RestMethod`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MethodSet(u8);

impl MethodSet {
    /// GET, PUT, POST and DELETE: the usual CRUD quartet.
    pub const BASIC: MethodSet = MethodSet(0b0000_1111);
    /// All eight verbs.
    pub const ALL: MethodSet = MethodSet(0b1111_1111);

    #[must_use]
    pub const fn empty() -> Self {
        MethodSet(0)
    }

    #[must_use]
    pub fn with(mut self, method: RestMethod) -> Self {
        self.insert(method);
        self
    }

    pub fn insert(&mut self, method: RestMethod) {
        self.0 |= method.bit();
    }

    #[must_use]
    pub fn contains(&self, method: RestMethod) -> bool {
        self.0 & method.bit() != 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = RestMethod> + '_ {
        RestMethod::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Comma separated wire names, as used by `Allow` and CORS headers.
    #[must_use]
    pub fn join(&self, sep: &str) -> String {
        self.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(sep)
    }
}

impl FromIterator<RestMethod> for MethodSet {
    fn from_iter<I: IntoIterator<Item = RestMethod>>(iter: I) -> Self {
        iter.into_iter().fold(MethodSet::empty(), MethodSet::with)
    }
}

impl fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("get".parse::<RestMethod>(), Ok(RestMethod::Get));
        assert_eq!(" Options ".parse::<RestMethod>(), Ok(RestMethod::Options));
        assert_eq!(
            "BREW".parse::<RestMethod>(),
            Err(UnknownMethod("BREW".to_string()))
        );
    }

    #[test]
    fn test_method_set_canonical_order() {
        let set: MethodSet = [RestMethod::Delete, RestMethod::Get, RestMethod::Options]
            .into_iter()
            .collect();
        assert_eq!(set.join(", "), "GET, DELETE, OPTIONS");
        assert!(set.contains(RestMethod::Delete));
        assert!(!set.contains(RestMethod::Put));
    }

    #[test]
    fn test_basic_set() {
        assert_eq!(MethodSet::BASIC.join(","), "GET,PUT,POST,DELETE");
        assert_eq!(MethodSet::ALL.iter().count(), 8);
        assert!(MethodSet::empty().is_empty());
    }
}
