use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, info_span, warn};

use super::RestContext;
use crate::config::RestConfig;
use crate::content::ContentType;
use crate::method::{MethodSet, RestMethod};
use crate::negotiation::{HeaderNegotiator, RequestNegotiator};
use crate::registry::{CapabilityRegistry, CapabilitySet, Role};
use crate::resource::{Endpoint, HandlerSource, Resource, ResourceCatalog};
use crate::serializers::{self, etag, to_json};
use crate::server::{RestRequest, RestResponse};
use crate::signal::{Message, Signal};

/// Request header carrying the method override.
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-METHOD-OVERRIDE";

/// Route/query parameter carrying the content override.
pub const CONTENT_OVERRIDE_PARAM: &str = "content_type";

/// Where a dispatch stands. Stages only ever move forward, one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchState {
    Constructed,
    MethodResolved,
    HandlerResolved,
    ContentResolved,
    CharsetResolved,
    LanguageResolved,
    MethodAllowedChecked,
    CorsApplied,
    AuthChecked,
    Invoked,
    Finalized,
}

impl DispatchState {
    /// The stage that may follow this one.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        use DispatchState::*;
        match self {
            Constructed => Some(MethodResolved),
            MethodResolved => Some(HandlerResolved),
            HandlerResolved => Some(ContentResolved),
            ContentResolved => Some(CharsetResolved),
            CharsetResolved => Some(LanguageResolved),
            LanguageResolved => Some(MethodAllowedChecked),
            MethodAllowedChecked => Some(CorsApplied),
            CorsApplied => Some(AuthChecked),
            AuthChecked => Some(Invoked),
            Invoked => Some(Finalized),
            Finalized => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Constructed => "constructed",
            DispatchState::MethodResolved => "method_resolved",
            DispatchState::HandlerResolved => "handler_resolved",
            DispatchState::ContentResolved => "content_resolved",
            DispatchState::CharsetResolved => "charset_resolved",
            DispatchState::LanguageResolved => "language_resolved",
            DispatchState::MethodAllowedChecked => "method_allowed_checked",
            DispatchState::CorsApplied => "cors_applied",
            DispatchState::AuthChecked => "auth_checked",
            DispatchState::Invoked => "invoked",
            DispatchState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an `If-None-Match` value matches `etag`. Weak validators compare
/// by their opaque tag.
fn if_none_match(header: &str, etag: &str) -> bool {
    header
        .split(',')
        .map(str::trim)
        .map(|t| t.strip_prefix("W/").unwrap_or(t))
        .any(|t| t == "*" || t == etag)
}

fn no_handler() -> Signal {
    Signal::internal("No resource resolved for this dispatch.")
}

/// Drives one request through negotiation, checks, invocation and rendering.
///
/// A dispatcher is built per request and consumed by it. Each stage is a
/// public method so adapters can run a subset; [`Dispatcher::run`] runs them
/// all in order.
pub struct Dispatcher<'a> {
    registry: &'a CapabilityRegistry,
    negotiator: Box<dyn HeaderNegotiator + 'a>,
    state: DispatchState,
    ctx: RestContext,
    handler: Option<Box<dyn Resource>>,
    capabilities: CapabilitySet,
    result: Option<Value>,
}

impl fmt::Debug for Dispatcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state)
            .field("resource", &self.ctx.resource_name())
            .field("method", &self.ctx.method())
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl<'a> Dispatcher<'a> {
    /// Dispatcher negotiating against the request's own preference headers.
    #[must_use]
    pub fn new(
        request: RestRequest,
        config: Arc<RestConfig>,
        registry: &'a CapabilityRegistry,
    ) -> Self {
        let negotiator = RequestNegotiator::from_request(&request);
        Self::with_negotiator(request, config, registry, Box::new(negotiator))
    }

    #[must_use]
    pub fn with_negotiator(
        request: RestRequest,
        config: Arc<RestConfig>,
        registry: &'a CapabilityRegistry,
        negotiator: Box<dyn HeaderNegotiator + 'a>,
    ) -> Self {
        Self {
            registry,
            negotiator,
            state: DispatchState::Constructed,
            ctx: RestContext::new(request, config),
            handler: None,
            capabilities: CapabilitySet::new(),
            result: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[must_use]
    pub fn context(&self) -> &RestContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RestContext {
        &mut self.ctx
    }

    /// Supported methods of the resolved resource, canonical order.
    #[must_use]
    pub fn allowed(&self) -> MethodSet {
        self.ctx.allowed()
    }

    /// Method capabilities of the resolved resource.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Result stored by `invoke`.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Hand back the response built so far, headers included.
    pub fn take_response(&mut self) -> RestResponse {
        self.ctx.take_response()
    }

    fn require(&self, stage: DispatchState) -> Result<(), Signal> {
        if self.state.next() == Some(stage) {
            return Ok(());
        }
        error!(
            current = %self.state,
            requested = %stage,
            "Dispatch stage out of order"
        );
        Err(Signal::internal(
            Message::new("Dispatch stage :stage cannot follow :state.")
                .param(":stage", stage)
                .param(":state", self.state),
        ))
    }

    /// The override header when enabled and present, else the request method.
    pub fn resolve_method(&mut self) -> Result<&str, Signal> {
        self.require(DispatchState::MethodResolved)?;
        if self.ctx.config().method_override {
            let overridden = self
                .ctx
                .request()
                .get_header(METHOD_OVERRIDE_HEADER)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_ascii_uppercase);
            if let Some(method) = overridden {
                debug!(
                    declared = %self.ctx.request().method,
                    method = %method,
                    "Method overridden"
                );
                self.ctx.set_method(method);
            }
        }
        self.state = DispatchState::MethodResolved;
        Ok(self.ctx.method())
    }

    /// Resolve the resource and record its method capabilities.
    pub fn resolve_handler(
        &mut self,
        source: HandlerSource,
        catalog: &ResourceCatalog,
    ) -> Result<(), Signal> {
        self.require(DispatchState::HandlerResolved)?;
        let (name, resource) = match source {
            HandlerSource::Instance { name, resource } => (name, resource),
            HandlerSource::Named(name) => match catalog.create(&name) {
                Some(resource) => (name, resource),
                None => {
                    warn!(resource = %name, "Resource type not found");
                    return Err(Signal::not_found(
                        Message::new("Resource type :name not found").param(":name", &name),
                    ));
                }
            },
        };

        let declared = resource.methods();
        if declared.is_empty() {
            error!(resource = %name, "Resource declares no methods");
            return Err(Signal::internal(
                Message::new("Resource :name does not declare any method.").param(":name", &name),
            ));
        }

        self.capabilities = self.registry.method_capabilities(declared);
        let allowed = self.registry.allowed_methods(&self.capabilities);
        self.ctx.set_resource(&name, allowed);
        self.handler = Some(resource);
        debug!(
            resource = %self.ctx.resource_name(),
            allowed = %allowed.join(","),
            "Resource resolved"
        );
        self.state = DispatchState::HandlerResolved;
        Ok(())
    }

    /// MIMEs of the content table whose capability `endpoint` declares, in
    /// table order.
    #[must_use]
    pub fn acceptable_content_types(&self, endpoint: &Endpoint) -> Vec<String> {
        let caps = endpoint.capabilities(self.registry);
        ContentType::ALL
            .into_iter()
            .filter(|t| caps.contains(&self.registry.capability_id(Role::Content, t.short_name())))
            .map(|t| t.mime().to_string())
            .collect()
    }

    fn content_override(&self) -> Option<String> {
        if !self.ctx.config().content_override {
            return None;
        }
        self.ctx
            .param(CONTENT_OVERRIDE_PARAM)
            .or_else(|| self.ctx.query(CONTENT_OVERRIDE_PARAM))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Pick the response representation.
    ///
    /// An enabled override names a short name that must be both in the content
    /// table and acceptable to `endpoint`. Without one, the `Accept` header is
    /// negotiated against the configured types (or the endpoint's).
    pub fn resolve_content(&mut self, endpoint: &Endpoint) -> Result<ContentType, Signal> {
        self.require(DispatchState::ContentResolved)?;
        let acceptable = self.acceptable_content_types(endpoint);
        let supported = acceptable.join(", ");

        let content = if let Some(requested) = self.content_override() {
            let Some(content) = ContentType::from_short_name(&requested) else {
                return Err(Signal::not_acceptable(
                    Message::new("Supplied Override Type: :accept not supported. Supported types: :types")
                        .param(":accept", &requested)
                        .param(":types", &supported),
                ));
            };
            if !acceptable.iter().any(|m| m == content.mime()) {
                return Err(Signal::not_acceptable(
                    Message::new("Supplied Content Type: :accept not supported. Supported types: :types")
                        .param(":accept", &requested)
                        .param(":types", &supported),
                ));
            }
            debug!(content = %content.short_name(), "Content overridden");
            content
        } else {
            let candidates = self
                .ctx
                .config()
                .types
                .clone()
                .unwrap_or_else(|| acceptable.clone());
            let Some(mime) = self.negotiator.preferred_accept(&candidates) else {
                let accept = self.ctx.request().get_header("accept").unwrap_or_default();
                return Err(Signal::not_acceptable(
                    Message::new("Supplied Accept types: :accept not supported. Supported types: :types")
                        .param(":accept", accept)
                        .param(":types", candidates.join(", ")),
                ));
            };
            ContentType::from_mime(&mime).ok_or_else(|| {
                error!(mime = %mime, "Negotiated type has no serializer");
                Signal::internal(
                    Message::new("No serializer for content type :type.").param(":type", &mime),
                )
            })?
        };

        self.ctx.content = Some(content);
        self.state = DispatchState::ContentResolved;
        Ok(content)
    }

    pub fn resolve_charset(&mut self) -> Result<String, Signal> {
        self.require(DispatchState::CharsetResolved)?;
        let candidates = &self.ctx.config().charsets;
        let Some(charset) = self.negotiator.preferred_charset(candidates) else {
            let accept = self.ctx.request().get_header("accept-charset").unwrap_or_default();
            return Err(Signal::not_acceptable(
                Message::new("Supplied Accept-Charset: :accept not supported. Supported types: :types")
                    .param(":accept", accept)
                    .param(":types", candidates.join(", ")),
            ));
        };
        self.ctx.charset = Some(charset.clone());
        self.state = DispatchState::CharsetResolved;
        Ok(charset)
    }

    pub fn resolve_language(&mut self) -> Result<String, Signal> {
        self.require(DispatchState::LanguageResolved)?;
        let candidates = &self.ctx.config().languages;
        let Some(language) = self.negotiator.preferred_language(candidates) else {
            let accept = self.ctx.request().get_header("accept-language").unwrap_or_default();
            return Err(Signal::not_acceptable(
                Message::new(
                    "Supplied Accept-Language: :accept not supported. Supported languages: :languages",
                )
                .param(":accept", accept)
                .param(":languages", candidates.join(", ")),
            ));
        };
        self.ctx.language = Some(language.clone());
        self.state = DispatchState::LanguageResolved;
        Ok(language)
    }

    /// Fail with `405` unless the resource holds the method capability. The
    /// `Allow` header lists every supported verb either way.
    pub fn check_method_allowed(&mut self) -> Result<RestMethod, Signal> {
        self.require(DispatchState::MethodAllowedChecked)?;
        let allowed = self.ctx.allowed();
        let method = self.ctx.method().parse::<RestMethod>().ok().filter(|m| {
            self.capabilities
                .contains(&self.registry.capability_id(Role::Method, m.as_str()))
        });
        let Some(method) = method else {
            let requested = self.ctx.method().to_string();
            self.ctx.response_mut().set_header("Allow", allowed.join(", "));
            warn!(
                resource = %self.ctx.resource_name(),
                method = %requested,
                allow = %allowed.join(", "),
                "Method not allowed"
            );
            return Err(Signal::MethodNotAllowed {
                message: Message::new("Method :method not allowed.").param(":method", requested),
                allow: allowed,
            });
        };
        self.state = DispatchState::MethodAllowedChecked;
        Ok(method)
    }

    pub fn run_cors_hook(&mut self) -> Result<(), Signal> {
        self.require(DispatchState::CorsApplied)?;
        let handler = self.handler.as_mut().ok_or_else(no_handler)?;
        handler.cors(&mut self.ctx)?;
        self.state = DispatchState::CorsApplied;
        Ok(())
    }

    pub fn run_auth_hook(&mut self) -> Result<(), Signal> {
        self.require(DispatchState::AuthChecked)?;
        let handler = self.handler.as_mut().ok_or_else(no_handler)?;
        if !handler.authorize(&self.ctx) {
            warn!(resource = %self.ctx.resource_name(), "Request denied by auth hook");
            return Err(Signal::unauthorized());
        }
        self.state = DispatchState::AuthChecked;
        Ok(())
    }

    /// Call the operation the method maps to through the `exec` role.
    ///
    /// The result is the returned value, else [`Resource::values`], else null.
    pub fn invoke(&mut self) -> Result<&Value, Signal> {
        self.require(DispatchState::Invoked)?;
        let exec = self.registry.capability_id(Role::Exec, self.ctx.method());
        let operation = self
            .registry
            .short_name(Role::Exec, &exec)
            .parse::<RestMethod>()
            .map_err(|e| {
                Signal::internal(
                    Message::new("No operation for :exec: :error")
                        .param(":exec", &exec)
                        .param(":error", e),
                )
            })?;
        debug!(exec = %exec, "Invoking resource operation");

        let handler = self.handler.as_mut().ok_or_else(no_handler)?;
        let ctx = &mut self.ctx;
        let returned = match operation {
            RestMethod::Get => handler.get(ctx),
            RestMethod::Put => handler.put(ctx),
            RestMethod::Post => handler.post(ctx),
            RestMethod::Delete => handler.delete(ctx),
            RestMethod::Head => handler.head(ctx),
            RestMethod::Trace => handler.trace(ctx),
            RestMethod::Patch => handler.patch(ctx),
            RestMethod::Options => handler.options(ctx),
        }?;
        let value = returned
            .or_else(|| handler.values())
            .unwrap_or(Value::Null);

        self.state = DispatchState::Invoked;
        Ok(&*self.result.insert(value))
    }

    /// Write `Content-Type` and `Content-Language` for the negotiated values.
    pub fn finalize(&mut self) -> Result<(), Signal> {
        self.require(DispatchState::Finalized)?;
        let (Some(content), Some(charset), Some(language)) = (
            self.ctx.content_type(),
            self.ctx.charset().map(str::to_string),
            self.ctx.language().map(str::to_string),
        ) else {
            return Err(Signal::internal("Negotiation incomplete at finalize."));
        };
        let response = self.ctx.response_mut();
        response.set_header("Content-Type", format!("{}; charset={charset}", content.mime()));
        response.set_header("Content-Language", language);
        self.state = DispatchState::Finalized;
        Ok(())
    }

    /// Serialize the stored result into the response body.
    ///
    /// The XML root and the CSV filename come from
    /// [`RestContext::representation_name`]. JSON and XML-family bodies carry
    /// an `ETag` when enabled; a matching `If-None-Match` ends the dispatch
    /// with `304`. CSV bodies carry a `Content-disposition` filename.
    pub fn render(&mut self) -> Result<(), Signal> {
        if self.state != DispatchState::Finalized {
            return Err(Signal::internal(
                Message::new("Cannot render a dispatch in state :state.").param(":state", self.state),
            ));
        }
        let Some(content) = self.ctx.content_type() else {
            return Err(Signal::internal("Negotiation incomplete at render."));
        };
        let value = self.result.take().unwrap_or(Value::Null);
        let name = self.ctx.representation_name().to_string();
        let body = serializers::render(content, &value, &name)?;

        if content == ContentType::Json || content.is_xml_family() {
            if self.ctx.config().etag {
                let tag = etag(&to_json(&value)?);
                let matched = self
                    .ctx
                    .request()
                    .get_header("if-none-match")
                    .is_some_and(|h| if_none_match(h, &tag));
                if matched {
                    debug!(etag = %tag, "Representation not modified");
                    self.result = Some(value);
                    return Err(Signal::NotModified { etag: tag });
                }
                self.ctx.response_mut().set_header("ETag", tag);
            }
        } else if content == ContentType::Csv {
            self.ctx
                .response_mut()
                .set_header("Content-disposition", format!("filename={name}.csv"));
        }

        self.result = Some(value);
        self.ctx.response_mut().body = body;
        Ok(())
    }

    /// Every stage from method resolution to rendering, halting at the first
    /// signal.
    pub fn execute(
        &mut self,
        source: HandlerSource,
        catalog: &ResourceCatalog,
        endpoint: &Endpoint,
    ) -> Result<(), Signal> {
        self.resolve_method()?;
        self.resolve_handler(source, catalog)?;
        self.resolve_content(endpoint)?;
        self.resolve_charset()?;
        self.resolve_language()?;
        self.check_method_allowed()?;
        self.run_cors_hook()?;
        self.run_auth_hook()?;
        self.invoke()?;
        self.finalize()?;
        self.render()
    }

    /// [`execute`](Self::execute) inside a `dispatch` span, with the outcome logged.
    pub fn run(
        &mut self,
        source: HandlerSource,
        catalog: &ResourceCatalog,
        endpoint: &Endpoint,
    ) -> Result<(), Signal> {
        let request = self.ctx.request();
        let span = info_span!(
            "dispatch",
            request_id = %request.request_id,
            method = %request.method,
            path = %request.path
        );
        let _enter = span.enter();

        let outcome = self.execute(source, catalog, endpoint);
        match &outcome {
            Ok(()) => info!(
                resource = %self.ctx.resource_name(),
                method = %self.ctx.method(),
                content = self.ctx.content_type().map(|c| c.short_name()).unwrap_or_default(),
                state = %self.state,
                "Dispatch complete"
            ),
            Err(signal) => debug!(
                resource = %self.ctx.resource_name(),
                status = signal.status_code().as_u16(),
                state = %self.state,
                "Dispatch halted by signal"
            ),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ExecResult, TestResource, TestStore};
    use http::StatusCode;
    use serde_json::json;

    struct Stateful {
        value: Option<Value>,
    }

    impl Resource for Stateful {
        fn methods(&self) -> MethodSet {
            MethodSet::empty().with(RestMethod::Get)
        }

        fn get(&mut self, _ctx: &mut RestContext) -> ExecResult {
            self.value = Some(json!({"kept": true}));
            Ok(None)
        }

        fn values(&self) -> Option<Value> {
            self.value.clone()
        }
    }

    /// Renders under a name of its own choosing.
    struct Renamed;

    impl Resource for Renamed {
        fn methods(&self) -> MethodSet {
            MethodSet::empty().with(RestMethod::Get)
        }

        fn get(&mut self, ctx: &mut RestContext) -> ExecResult {
            ctx.set_representation_name("entries");
            Ok(Some(json!([{"id": 1}, {"id": 2}])))
        }
    }

    fn run_renamed(accept: &str) -> RestResponse {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(
            RestRequest::new("GET", "/rest/renamed").with_header("Accept", accept),
            config(),
            &reg,
        );
        d.execute(
            HandlerSource::Instance {
                name: "renamed".into(),
                resource: Box::new(Renamed),
            },
            &catalog(),
            &Endpoint::standard(),
        )
        .unwrap();
        assert_eq!(d.context().resource_name(), "renamed");
        d.take_response()
    }

    struct Silent;

    impl Resource for Silent {
        fn methods(&self) -> MethodSet {
            MethodSet::empty()
        }
    }

    fn catalog() -> ResourceCatalog {
        let store = TestStore::seeded();
        ResourceCatalog::new(CapabilityRegistry::new()).with("test", move || {
            Box::new(TestResource::new(store.clone())) as Box<dyn Resource>
        })
    }

    fn config() -> Arc<RestConfig> {
        Arc::new(RestConfig::default())
    }

    #[test]
    fn test_state_order() {
        assert!(DispatchState::Constructed < DispatchState::Finalized);
        assert_eq!(DispatchState::Invoked.next(), Some(DispatchState::Finalized));
        assert_eq!(DispatchState::Finalized.next(), None);
    }

    #[test]
    fn test_stage_out_of_order_is_internal() {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(RestRequest::new("GET", "/rest/test"), config(), &reg);
        let err = d.resolve_charset().unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(d.state(), DispatchState::Constructed);
    }

    #[test]
    fn test_method_override() {
        let reg = CapabilityRegistry::new();
        let req = RestRequest::new("POST", "/rest/test").with_header("X-HTTP-Method-Override", "put");
        let mut d = Dispatcher::new(req.clone(), config(), &reg);
        assert_eq!(d.resolve_method().unwrap(), "PUT");

        let off = Arc::new(RestConfig {
            method_override: false,
            ..RestConfig::default()
        });
        let mut d = Dispatcher::new(req, off, &reg);
        assert_eq!(d.resolve_method().unwrap(), "POST");
    }

    #[test]
    fn test_unknown_resource_is_not_found() {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(RestRequest::new("GET", "/rest/nope"), config(), &reg);
        d.resolve_method().unwrap();
        let err = d
            .resolve_handler(HandlerSource::Named("nope".into()), &catalog())
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.body_text(), "Resource type nope not found");
    }

    #[test]
    fn test_empty_contract_is_internal() {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(RestRequest::new("GET", "/rest/silent"), config(), &reg);
        d.resolve_method().unwrap();
        let err = d
            .resolve_handler(
                HandlerSource::Instance {
                    name: "silent".into(),
                    resource: Box::new(Silent),
                },
                &catalog(),
            )
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_acceptable_types_follow_table_order() {
        let reg = CapabilityRegistry::new();
        let d = Dispatcher::new(RestRequest::new("GET", "/"), config(), &reg);
        let endpoint = Endpoint::new([ContentType::Csv, ContentType::Json]);
        assert_eq!(
            d.acceptable_content_types(&endpoint),
            vec!["application/json".to_string(), "application/vnd.ms-excel".to_string()]
        );
    }

    #[test]
    fn test_values_accessor_result() {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(
            RestRequest::new("GET", "/rest/stateful").with_header("Accept", "application/json"),
            config(),
            &reg,
        );
        d.execute(
            HandlerSource::Instance {
                name: "stateful".into(),
                resource: Box::new(Stateful { value: None }),
            },
            &catalog(),
            &Endpoint::standard(),
        )
        .unwrap();
        assert_eq!(d.state(), DispatchState::Finalized);
        assert_eq!(d.result(), Some(&json!({"kept": true})));
        let resp = d.take_response();
        assert_eq!(resp.body, r#"{"kept":true}"#);
        assert_eq!(
            resp.get_header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(resp.get_header("Content-Language"), Some("en-us"));
    }

    #[test]
    fn test_method_check_sets_allow() {
        let reg = CapabilityRegistry::new();
        let mut d = Dispatcher::new(
            RestRequest::new("PATCH", "/rest/test").with_param("id", "1"),
            config(),
            &reg,
        );
        let err = d
            .execute(HandlerSource::Named("test".into()), &catalog(), &Endpoint::standard())
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(d.state(), DispatchState::LanguageResolved);
        assert_eq!(
            d.take_response().get_header("Allow"),
            Some("GET, PUT, POST, DELETE, OPTIONS")
        );
    }

    #[test]
    fn test_representation_name_sets_xml_root() {
        let resp = run_renamed("application/xml");
        assert!(resp
            .body
            .contains("<entries><entry><id>1</id></entry><entry><id>2</id></entry></entries>"));
        assert!(!resp.body.contains("renamed"));
    }

    #[test]
    fn test_representation_name_sets_csv_filename() {
        let resp = run_renamed("application/vnd.ms-excel");
        assert_eq!(resp.get_header("Content-disposition"), Some("filename=entries.csv"));
        assert_eq!(resp.body, "\"id\"\n\"1\"\n\"2\"\n");
    }

    #[test]
    fn test_if_none_match() {
        assert!(if_none_match("\"abc\"", "\"abc\""));
        assert!(if_none_match("W/\"abc\", \"x\"", "\"abc\""));
        assert!(if_none_match("*", "\"abc\""));
        assert!(!if_none_match("\"abd\"", "\"abc\""));
    }
}
