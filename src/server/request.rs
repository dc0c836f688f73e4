use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::ids::RequestId;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for requests and responses.
///
/// Names keep the case they were written with; lookups are case-insensitive.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data handed to one dispatch.
///
/// The dispatcher never talks to an HTTP server directly. Adapters build a
/// `RestRequest` from whatever their framework delivers.
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method as received, not validated
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// Route parameters in match order (`id`, `content_type`)
    pub route_params: ParamVec,
    /// Query string parameters in request order
    pub query_params: ParamVec,
    /// HTTP headers
    pub headers: HeaderVec,
    /// Raw request body bytes, decoded on demand by `RestContext::body`
    pub body: Vec<u8>,
}

impl RestRequest {
    /// Request for `method` on `path`; a query string in `path` is parsed.
    pub fn new(method: impl Into<String>, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        Self {
            request_id: RequestId::new(),
            method: method.into(),
            path: path.to_string(),
            route_params: ParamVec::new(),
            query_params: query.map(parse_query_string).unwrap_or_default(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.route_params.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Reuse an incoming `X-Request-ID` when it is a valid ULID.
    #[must_use]
    pub fn with_request_id_from_headers(mut self) -> Self {
        self.request_id = RequestId::from_header_or_new(self.get_header("x-request-id"));
        self
    }

    /// Get a route parameter by name
    ///
    /// Last write wins when a name repeats.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.route_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Last write wins when a name repeats (`?limit=10&limit=20`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Decode an `application/x-www-form-urlencoded` string into ordered pairs.
pub fn parse_query_string(query: &str) -> ParamVec {
    let params: ParamVec = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect();
    debug!(param_count = params.len(), "Query params parsed");
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_query() {
        let req = RestRequest::new("GET", "/rest/test?limit=10&limit=20&q=a%20b");
        assert_eq!(req.path, "/rest/test");
        assert_eq!(req.get_query_param("limit"), Some("20"));
        assert_eq!(req.get_query_param("q"), Some("a b"));
        assert_eq!(req.query_params.len(), 3);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = RestRequest::new("GET", "/").with_header("Accept-Language", "en");
        assert_eq!(req.get_header("accept-language"), Some("en"));
        assert_eq!(req.get_header("ACCEPT-LANGUAGE"), Some("en"));
        assert_eq!(req.get_header("accept"), None);
    }

    #[test]
    fn test_request_id_from_header() {
        let id = RequestId::new();
        let req = RestRequest::new("GET", "/")
            .with_header("X-Request-ID", id.to_string())
            .with_request_id_from_headers();
        assert_eq!(req.request_id, id);
    }
}
