//! The single REST route: `<prefix>/<resource>((/<id>)(.<content_type>))`.
//!
//! ```text
//! /rest/test            resource=test
//! /rest/test/3          resource=test id=3
//! /rest/test/3.csv      resource=test id=3 content_type=csv
//! /rest/test.xml        resource=test content_type=xml
//! ```
//!
//! The extension becomes the `content_type` route parameter that feeds the
//! content override.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use tracing::debug;

/// Maximum number of route/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered name/value pairs for route and query parameters.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

// Segment characters follow the usual route-segment rule: no `/ . , ; ?`.
#[allow(clippy::expect_used)]
static SEGMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^/(?P<resource>[^/.,;?]+)(?:(?:/(?P<id>[^/.,;?]+))?(?:\.(?P<content_type>[^/.,;?]+))?)?/?$",
    )
    .expect("REST route regex should be valid")
});

/// Result of matching a path against the REST route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// Resource short name (`test` in `/rest/test/3`)
    pub resource: String,
    /// `id` and `content_type`, when present
    pub params: ParamVec,
}

impl RouteMatch {
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// REST route mounted under a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestRoute {
    prefix: String,
}

impl Default for RestRoute {
    fn default() -> Self {
        Self::new("rest")
    }
}

impl RestRoute {
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Match a request path (query string ignored).
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<RouteMatch> {
        let path = path.split('?').next().unwrap_or_default();
        let path = path.trim_start_matches('/');
        let rest = if self.prefix.is_empty() {
            path
        } else {
            path.strip_prefix(self.prefix.as_str())?
        };
        if !rest.starts_with('/') {
            return None;
        }
        let caps = SEGMENTS.captures(rest)?;

        let resource = caps.name("resource")?.as_str().to_string();
        let mut params = ParamVec::new();
        for name in ["id", "content_type"] {
            if let Some(m) = caps.name(name) {
                params.push((Arc::from(name), m.as_str().to_string()));
            }
        }
        debug!(resource = %resource, params = ?params, "REST route matched");
        Some(RouteMatch { resource, params })
    }

    /// `{base}/{prefix}/{resource}/{id}`
    #[must_use]
    pub fn url(&self, base: &str, resource: &str, id: &str) -> String {
        let base = base.trim_end_matches('/');
        if self.prefix.is_empty() {
            format!("{base}/{resource}/{id}")
        } else {
            format!("{base}/{}/{resource}/{id}", self.prefix)
        }
    }
}
