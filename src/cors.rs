//! # CORS Policy
//!
//! A resource's CORS hook does not write headers itself. It calls
//! `RestContext::apply_cors` with a set of [`CorsOverrides`], which are merged
//! key-wise over the default [`CorsPolicy`]:
//!
//! | Field | Default | Header |
//! |---|---|---|
//! | `origin` | `*` | `Access-Control-Allow-Origin` |
//! | `methods` | the resource's allowed methods | `Access-Control-Allow-Methods` |
//! | `headers` | configured allow-list | `Access-Control-Allow-Headers` |
//! | `expose` | none | `Access-Control-Expose-Headers` |
//! | `credentials` | none | `Access-Control-Allow-Credentials` |
//! | `max_age` | none | `Access-Control-Max-Age` |
//!
//! Every field left set after the merge is emitted; cleared fields are not.
//!
//! [`OriginValidation`] is a helper for hooks that echo the request origin only
//! when it is on an allow-list.

use std::sync::Arc;

use regex::Regex;
use thiserror::Error;

use crate::method::MethodSet;

/// Default `Access-Control-Allow-Headers` list.
pub const DEFAULT_ALLOWED_HEADERS: [&str; 6] = [
    "Origin",
    "Accept",
    "Accept-Language",
    "Content-Type",
    "X-Requested-With",
    "X-CSRF-Token",
];

/// Effective CORS values for one response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorsPolicy {
    pub origin: Option<Vec<String>>,
    pub methods: Option<Vec<String>>,
    pub headers: Option<Vec<String>>,
    pub expose: Option<Vec<String>>,
    pub credentials: Option<bool>,
    pub max_age: Option<u32>,
}

impl CorsPolicy {
    /// Defaults for a resource answering `allowed`.
    #[must_use]
    pub fn defaults(allowed: MethodSet, allowed_headers: &[String]) -> Self {
        Self {
            origin: Some(vec!["*".to_string()]),
            methods: Some(allowed.iter().map(|m| m.as_str().to_string()).collect()),
            headers: Some(allowed_headers.to_vec()),
            expose: None,
            credentials: None,
            max_age: None,
        }
    }

    /// Key-wise merge; `Keep` leaves the default in place.
    #[must_use]
    pub fn merge(mut self, overrides: &CorsOverrides) -> Self {
        overrides.origin.apply(&mut self.origin);
        overrides.methods.apply(&mut self.methods);
        overrides.headers.apply(&mut self.headers);
        overrides.expose.apply(&mut self.expose);
        overrides.credentials.apply(&mut self.credentials);
        overrides.max_age.apply(&mut self.max_age);
        self
    }

    /// `Access-Control-*` headers for every field that is set.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(6);
        if let Some(origin) = &self.origin {
            out.push(("Access-Control-Allow-Origin", origin.join(", ")));
        }
        if let Some(methods) = &self.methods {
            out.push(("Access-Control-Allow-Methods", methods.join(", ")));
        }
        if let Some(headers) = &self.headers {
            out.push(("Access-Control-Allow-Headers", headers.join(", ")));
        }
        if let Some(expose) = &self.expose {
            out.push(("Access-Control-Expose-Headers", expose.join(", ")));
        }
        if let Some(creds) = self.credentials {
            out.push(("Access-Control-Allow-Credentials", creds.to_string()));
        }
        if let Some(age) = self.max_age {
            out.push(("Access-Control-Max-Age", age.to_string()));
        }
        out
    }
}

/// Three-way override of one policy field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Override<T> {
    /// Keep the default
    #[default]
    Keep,
    /// Replace the default
    Set(T),
    /// Drop the field so its header is not emitted
    Clear,
}

impl<T: Clone> Override<T> {
    fn apply(&self, slot: &mut Option<T>) {
        match self {
            Override::Keep => {}
            Override::Set(v) => *slot = Some(v.clone()),
            Override::Clear => *slot = None,
        }
    }
}

/// Values a CORS hook passes to `apply_cors`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CorsOverrides {
    pub origin: Override<Vec<String>>,
    pub methods: Override<Vec<String>>,
    pub headers: Override<Vec<String>>,
    pub expose: Override<Vec<String>>,
    pub credentials: Override<bool>,
    pub max_age: Override<u32>,
}

impl CorsOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Override::Set(vec![origin.into()]);
        self
    }

    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Override::Set(methods.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Override::Set(headers.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn expose<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose = Override::Set(headers.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn credentials(mut self, allow: bool) -> Self {
        self.credentials = Override::Set(allow);
        self
    }

    #[must_use]
    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Override::Set(seconds);
        self
    }

    #[must_use]
    pub fn clear_origin(mut self) -> Self {
        self.origin = Override::Clear;
        self
    }
}

/// CORS configuration errors, raised while building an [`OriginValidation`].
#[derive(Debug, Error)]
pub enum CorsConfigError {
    /// Wildcard origins cannot be combined with credentials
    #[error("wildcard origin cannot be used with credentials; list exact origins instead")]
    WildcardWithCredentials,
    /// A regex origin pattern failed to compile
    #[error("invalid origin pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// How a CORS hook decides whether a request origin may be echoed.
#[derive(Clone)]
pub enum OriginValidation {
    /// Exact string matching
    Exact(Vec<String>),
    /// Allow all origins
    Wildcard,
    /// Regex pattern matching
    Regex(Vec<Regex>),
    /// Custom validation function
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl std::fmt::Debug for OriginValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OriginValidation::Exact(origins) => f.debug_tuple("Exact").field(origins).finish(),
            OriginValidation::Wildcard => write!(f, "Wildcard"),
            OriginValidation::Regex(patterns) => f
                .debug_tuple("Regex")
                .field(&patterns.iter().map(|re| re.as_str()).collect::<Vec<_>>())
                .finish(),
            OriginValidation::Custom(_) => write!(f, "Custom(<function>)"),
        }
    }
}

impl OriginValidation {
    /// Exact list; a `*` entry turns it into [`OriginValidation::Wildcard`].
    pub fn exact<I, S>(origins: I, credentials: bool) -> Result<Self, CorsConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let origins: Vec<String> = origins.into_iter().map(Into::into).collect();
        let validation = if origins.iter().any(|o| o == "*") {
            OriginValidation::Wildcard
        } else {
            OriginValidation::Exact(origins)
        };
        if credentials && validation.is_wildcard() {
            return Err(CorsConfigError::WildcardWithCredentials);
        }
        Ok(validation)
    }

    pub fn regex<I, S>(patterns: I) -> Result<Self, CorsConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| CorsConfigError::InvalidRegex {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OriginValidation::Regex(compiled))
    }

    /// Check if an origin is allowed
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            OriginValidation::Exact(origins) => origins.iter().any(|o| o == origin),
            OriginValidation::Wildcard => true,
            OriginValidation::Regex(patterns) => patterns.iter().any(|re| re.is_match(origin)),
            OriginValidation::Custom(validator) => validator(origin),
        }
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, OriginValidation::Wildcard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;

    fn default_headers() -> Vec<String> {
        DEFAULT_ALLOWED_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn test_defaults_emit_origin_methods_headers() {
        let allowed = MethodSet::empty().with(RestMethod::Get).with(RestMethod::Options);
        let headers = CorsPolicy::defaults(allowed, &default_headers()).headers();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[0], ("Access-Control-Allow-Origin", "*".to_string()));
        assert_eq!(
            headers[1],
            ("Access-Control-Allow-Methods", "GET, OPTIONS".to_string())
        );
        assert!(headers[2].1.starts_with("Origin, Accept"));
    }

    #[test]
    fn test_merge_set_and_clear() {
        let policy = CorsPolicy::defaults(MethodSet::BASIC, &default_headers()).merge(
            &CorsOverrides::new()
                .origin("http://www.example.com")
                .credentials(true)
                .max_age(600),
        );
        assert_eq!(policy.origin, Some(vec!["http://www.example.com".to_string()]));
        assert_eq!(policy.credentials, Some(true));
        let headers = policy.headers();
        assert!(headers.contains(&("Access-Control-Allow-Credentials", "true".to_string())));
        assert!(headers.contains(&("Access-Control-Max-Age", "600".to_string())));

        let cleared = CorsPolicy::defaults(MethodSet::BASIC, &default_headers())
            .merge(&CorsOverrides::new().clear_origin());
        assert!(cleared
            .headers()
            .iter()
            .all(|(name, _)| *name != "Access-Control-Allow-Origin"));
    }

    #[test]
    fn test_origin_validation() {
        let exact = OriginValidation::exact(["http://a.test"], true).unwrap();
        assert!(exact.is_allowed("http://a.test"));
        assert!(!exact.is_allowed("http://b.test"));

        assert!(matches!(
            OriginValidation::exact(["*"], true),
            Err(CorsConfigError::WildcardWithCredentials)
        ));

        let re = OriginValidation::regex([r"^https://.*\.example\.com$"]).unwrap();
        assert!(re.is_allowed("https://api.example.com"));
        assert!(!re.is_allowed("https://example.org"));
        assert!(OriginValidation::regex(["("]).is_err());
    }
}
