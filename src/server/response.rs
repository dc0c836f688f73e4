use std::sync::Arc;

use super::request::HeaderVec;

/// Canonical reason phrase of `status`, `Unknown` outside the registry.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}

/// Response accumulated over one dispatch.
///
/// Headers set by earlier stages (CORS, `Allow`) survive when a later stage
/// turns the response into a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: String,
}

impl Default for RestResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: String::new(),
        }
    }
}

impl RestResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every header called `name` with a single value.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(406), "Not Acceptable");
        assert_eq!(status_reason(418), "I'm a teapot");
    }

    #[test]
    fn test_set_header_replaces() {
        let mut res = RestResponse::new();
        res.set_header("ETag", "a");
        res.set_header("etag", "b");
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("ETAG"), Some("b"));
        res.remove_header("ETag");
        assert!(res.headers.is_empty());
    }
}
