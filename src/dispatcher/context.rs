use std::fmt::Display;
use std::sync::Arc;

use http::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::RestConfig;
use crate::content::{short_name_for, ContentType};
use crate::cors::{CorsOverrides, CorsPolicy};
use crate::method::MethodSet;
use crate::serializers::{from_json, from_xml};
use crate::server::{RestRequest, RestResponse};
use crate::signal::{Message, Signal};

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

fn malformed(kind: &str, error: impl Display) -> Signal {
    debug!(kind = %kind, error = %error, "Request body rejected");
    Signal::status_with(
        StatusCode::BAD_REQUEST,
        Message::new("Malformed :kind request body: :error")
            .param(":kind", kind)
            .param(":error", error),
    )
}

/// Per-dispatch state a resource can read and write.
///
/// Owns the request and the response being built, plus everything negotiated
/// so far. Nothing in here outlives the dispatch.
#[derive(Debug)]
pub struct RestContext {
    request: RestRequest,
    response: RestResponse,
    config: Arc<RestConfig>,
    resource: String,
    representation: Option<String>,
    method: String,
    allowed: MethodSet,
    pub(crate) content: Option<ContentType>,
    pub(crate) charset: Option<String>,
    pub(crate) language: Option<String>,
}

impl RestContext {
    #[must_use]
    pub fn new(request: RestRequest, config: Arc<RestConfig>) -> Self {
        let method = request.method.trim().to_ascii_uppercase();
        Self {
            request,
            response: RestResponse::new(),
            config,
            resource: String::new(),
            representation: None,
            method,
            allowed: MethodSet::empty(),
            content: None,
            charset: None,
            language: None,
        }
    }

    #[must_use]
    pub fn request(&self) -> &RestRequest {
        &self.request
    }

    #[must_use]
    pub fn response(&self) -> &RestResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut RestResponse {
        &mut self.response
    }

    pub(crate) fn take_response(&mut self) -> RestResponse {
        std::mem::take(&mut self.response)
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Resolved method, upper-cased. May be any string when overridden.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn set_method(&mut self, method: String) {
        self.method = method;
    }

    /// Short name of the resolved resource.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    /// Name the rendered result goes by: the XML root element and the CSV
    /// filename. Defaults to the resource's short name.
    #[must_use]
    pub fn representation_name(&self) -> &str {
        self.representation.as_deref().unwrap_or(&self.resource)
    }

    /// Override [`representation_name`](Self::representation_name) for this
    /// dispatch.
    pub fn set_representation_name(&mut self, name: impl Into<String>) {
        self.representation = Some(name.into());
    }

    pub(crate) fn set_resource(&mut self, name: &str, allowed: MethodSet) {
        self.resource = name.to_lowercase();
        self.allowed = allowed;
    }

    /// Methods the resolved resource answers.
    #[must_use]
    pub fn allowed(&self) -> MethodSet {
        self.allowed
    }

    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.content
    }

    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Route parameter (`id`, `content_type`).
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.get_param(name)
    }

    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.get_query_param(name)
    }

    /// Query as JSON.
    ///
    /// A key with an empty value that parses as JSON (`?{"limit":5}`) is
    /// returned decoded; otherwise the query pairs as an object.
    #[must_use]
    pub fn query_json(&self) -> Value {
        for (key, value) in &self.request.query_params {
            if value.is_empty() {
                if let Ok(decoded) = serde_json::from_str::<Value>(key) {
                    return decoded;
                }
            }
        }
        Value::Object(
            self.request
                .query_params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Short name of the request `Content-Type` (`json`, `xml`, ...), or the raw
    /// value when it is not in the table.
    #[must_use]
    pub fn request_type(&self) -> String {
        short_name_for(self.request.get_header("content-type").unwrap_or_default())
    }

    /// Decode the request body as `kind`, or by the request `Content-Type`.
    ///
    /// JSON and XML bodies become values; anything else is returned as a string.
    /// A body that fails to decode, or is not UTF-8, is a `400`.
    pub fn body(&self, kind: Option<&str>) -> Result<Value, Signal> {
        let kind = kind.map_or_else(|| self.request_type(), str::to_string);
        let raw = std::str::from_utf8(&self.request.body).map_err(|e| malformed(&kind, e))?;
        let decoded = match ContentType::from_short_name(&kind) {
            Some(ContentType::Json) => from_json(raw),
            Some(t) if t.is_xml_family() => from_xml(raw),
            _ => return Ok(Value::String(raw.to_string())),
        };
        decoded.map_err(|e| malformed(&kind, e))
    }

    /// Form fields of an `application/x-www-form-urlencoded` body, in order.
    /// Empty for any other body.
    #[must_use]
    pub fn post(&self) -> Vec<(String, String)> {
        let is_form = self
            .request
            .get_header("content-type")
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(FORM_URLENCODED));
        if !is_form {
            return Vec::new();
        }
        url::form_urlencoded::parse(&self.request.body)
            .into_owned()
            .collect()
    }

    /// `201 Created` pointing at `{base}/{route_prefix}/{resource}/{id}`.
    #[must_use]
    pub fn created(&self, id: impl Display) -> Signal {
        self.created_with_status(id, StatusCode::CREATED)
    }

    #[must_use]
    pub fn created_with_status(&self, id: impl Display, status: StatusCode) -> Signal {
        let location = self
            .config
            .route()
            .url(&self.config.base_url, &self.resource, &id.to_string());
        Signal::Created { status, location }
    }

    /// Merge `overrides` over the default policy and write the CORS headers.
    pub fn apply_cors(&mut self, overrides: &CorsOverrides) {
        let policy =
            CorsPolicy::defaults(self.allowed, &self.config.cors.allowed_headers).merge(overrides);
        for (name, value) in policy.headers() {
            self.response.set_header(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::RestMethod;
    use serde_json::json;

    fn ctx(req: RestRequest) -> RestContext {
        RestContext::new(req, Arc::new(RestConfig::default()))
    }

    #[test]
    fn test_query_json() {
        let c = ctx(RestRequest::new("GET", r#"/rest/test?{"limit":5}"#));
        assert_eq!(c.query_json(), json!({"limit": 5}));
        let c = ctx(RestRequest::new("GET", "/rest/test?a=1&b=2"));
        assert_eq!(c.query_json(), json!({"a": "1", "b": "2"}));
    }

    #[test]
    fn test_body_by_request_type() {
        let c = ctx(
            RestRequest::new("PUT", "/")
                .with_header("Content-Type", "application/json; charset=utf-8")
                .with_body(r#"{"title":"x"}"#),
        );
        assert_eq!(c.request_type(), "json");
        assert_eq!(c.body(None).unwrap(), json!({"title": "x"}));

        let c = ctx(
            RestRequest::new("PUT", "/")
                .with_header("Content-Type", "application/xml")
                .with_body("<r><title>x</title></r>"),
        );
        assert_eq!(c.body(None).unwrap(), json!({"title": "x"}));

        let c = ctx(RestRequest::new("PUT", "/").with_body("plain"));
        assert_eq!(c.body(None).unwrap(), json!("plain"));
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let c = ctx(RestRequest::new("PUT", "/").with_body("{nope"));
        let err = c.body(Some("json")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_utf8_body_is_bad_request() {
        let c = ctx(
            RestRequest::new("PUT", "/")
                .with_header("Content-Type", "application/json")
                .with_body(vec![b'"', 0xff, 0xfe, b'"']),
        );
        let err = c.body(None).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.body_text().starts_with("Malformed json request body"));
        assert_eq!(c.request().body, vec![b'"', 0xff, 0xfe, b'"']);
    }

    #[test]
    fn test_representation_name_defaults_to_resource() {
        let mut c = ctx(RestRequest::new("GET", "/rest/test"));
        c.set_resource("Test", MethodSet::BASIC);
        assert_eq!(c.representation_name(), "test");
        c.set_representation_name("export");
        assert_eq!(c.representation_name(), "export");
        assert_eq!(c.resource_name(), "test");
    }

    #[test]
    fn test_post_form_fields() {
        let c = ctx(
            RestRequest::new("POST", "/")
                .with_header("Content-Type", "application/x-www-form-urlencoded")
                .with_body("title=ten&author=A+B"),
        );
        assert_eq!(
            c.post(),
            vec![
                ("title".to_string(), "ten".to_string()),
                ("author".to_string(), "A B".to_string())
            ]
        );
        let c = ctx(RestRequest::new("POST", "/").with_body("title=ten"));
        assert!(c.post().is_empty());
    }

    #[test]
    fn test_created_location() {
        let config = RestConfig {
            base_url: "http://api.test".to_string(),
            ..RestConfig::default()
        };
        let mut c = RestContext::new(RestRequest::new("POST", "/rest/test"), Arc::new(config));
        c.set_resource("Test", MethodSet::BASIC);
        assert_eq!(
            c.created(10),
            Signal::Created {
                status: StatusCode::CREATED,
                location: "http://api.test/rest/test/10".to_string()
            }
        );
    }

    #[test]
    fn test_apply_cors_uses_allowed_methods() {
        let mut c = ctx(RestRequest::new("OPTIONS", "/rest/test"));
        c.set_resource("test", MethodSet::empty().with(RestMethod::Get));
        c.apply_cors(&CorsOverrides::new());
        assert_eq!(c.response().get_header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(c.response().get_header("Access-Control-Allow-Methods"), Some("GET"));
        assert_eq!(c.response().get_header("Access-Control-Allow-Credentials"), None);
    }
}
