use std::sync::Arc;

use tracing::{debug, info, warn};

use super::request::RestRequest;
use super::response::RestResponse;
use crate::config::{ErrorBodyFormat, RestConfig};
use crate::dispatcher::Dispatcher;
use crate::registry::{CapabilityRegistry, RegistryError};
use crate::resource::{Endpoint, HandlerSource, Resource, ResourceCatalog, TestResource, TestStore};
use crate::router::RestRoute;
use crate::signal::{ErrorBody, Message, Signal, SignalMode};

/// Boundary between an HTTP framework and the dispatcher.
///
/// Holds everything that is fixed per process (configuration, registry,
/// resource catalog, endpoint types, route) and builds a fresh [`Dispatcher`]
/// for every request. This is the only place where [`SignalMode`] is applied.
#[derive(Clone, Debug)]
pub struct RestService {
    config: Arc<RestConfig>,
    registry: Arc<CapabilityRegistry>,
    catalog: ResourceCatalog,
    endpoint: Endpoint,
    route: RestRoute,
}

impl RestService {
    /// Service with an empty catalog and the standard endpoint types.
    ///
    /// Fails when the configured prefix table is incomplete or ambiguous.
    pub fn new(config: RestConfig) -> Result<Self, RegistryError> {
        let registry = config.registry()?;
        let route = config.route();
        info!(
            signal_mode = ?config.signal_mode,
            route_prefix = %route.prefix(),
            method_override = config.method_override,
            content_override = config.content_override,
            "REST service configured"
        );
        Ok(Self {
            catalog: ResourceCatalog::new(registry.clone()),
            registry: Arc::new(registry),
            config: Arc::new(config),
            endpoint: Endpoint::standard(),
            route,
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        self.catalog.register(name, factory);
    }

    #[must_use]
    pub fn with_resource<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Resource> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Register the demo `test` resource over `store`.
    #[must_use]
    pub fn with_demo(self, store: TestStore, token: Option<String>) -> Self {
        self.with_resource("test", move || {
            let resource = TestResource::new(store.clone());
            let resource = match &token {
                Some(t) => resource.with_token(t.clone()),
                None => resource,
            };
            Box::new(resource) as Box<dyn Resource>
        })
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Route `request` and dispatch it to the named resource.
    ///
    /// In immediate mode every signal becomes the returned response and this
    /// never fails. In recoverable mode signals are returned as `Err`.
    pub fn handle(&self, mut request: RestRequest) -> Result<RestResponse, Signal> {
        let Some(route) = self.route.matches(&request.path) else {
            debug!(path = %request.path, "No REST route matched");
            let signal =
                Signal::not_found(Message::new("No route for :path").param(":path", &request.path));
            return self.finish(&request, RestResponse::new(), Err(signal));
        };
        request.route_params.extend(route.params);
        self.dispatch(request, HandlerSource::Named(route.resource))
    }

    /// Dispatch `request` to an explicit handler source, skipping routing.
    pub fn dispatch(
        &self,
        request: RestRequest,
        source: HandlerSource,
    ) -> Result<RestResponse, Signal> {
        let mut dispatcher = Dispatcher::new(request, Arc::clone(&self.config), &self.registry);
        let outcome = dispatcher.run(source, &self.catalog, &self.endpoint);
        let response = dispatcher.take_response();
        self.finish(dispatcher.context().request(), response, outcome)
    }

    fn finish(
        &self,
        request: &RestRequest,
        mut response: RestResponse,
        outcome: Result<(), Signal>,
    ) -> Result<RestResponse, Signal> {
        response.set_header("X-Request-ID", request.request_id.to_string());
        let signal = match outcome {
            Ok(()) => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    "Request handled"
                );
                return Ok(response);
            }
            Err(signal) => signal,
        };

        let status = signal.status_code();
        if status.as_u16() >= 400 {
            warn!(
                request_id = %request.request_id,
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                error = %signal,
                "Request refused"
            );
        } else {
            debug!(
                request_id = %request.request_id,
                status = status.as_u16(),
                "Request ended by signal"
            );
        }

        match self.config.signal_mode {
            SignalMode::Recoverable => Err(signal),
            SignalMode::Immediate => Ok(self.write_signal(response, &signal)),
        }
    }

    /// Write `signal` over the accumulated response.
    ///
    /// Earlier headers (CORS, `Allow`) are kept; the signal's own headers are
    /// added and the body is replaced. JSON error bodies are only written for
    /// error statuses.
    #[must_use]
    pub fn write_signal(&self, mut response: RestResponse, signal: &Signal) -> RestResponse {
        response.status = signal.status_code().as_u16();
        for (name, value) in signal.headers() {
            response.set_header(name, value);
        }
        if signal.is_bodiless() {
            response.body.clear();
            return response;
        }
        match self.config.error_body {
            ErrorBodyFormat::Json if response.status >= 400 => {
                response.body = ErrorBody::from_signal(signal).to_json();
                response.set_header("Content-Type", "application/json; charset=utf-8");
            }
            _ => {
                response.body = signal.body_text();
                if response.body.is_empty() {
                    response.remove_header("Content-Type");
                } else {
                    response.set_header("Content-Type", "text/plain; charset=utf-8");
                }
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn service(config: RestConfig) -> RestService {
        RestService::new(config)
            .unwrap()
            .with_demo(TestStore::seeded(), None)
    }

    #[test]
    fn test_unrouted_path_is_not_found() {
        let svc = service(RestConfig::default());
        let resp = svc.handle(RestRequest::new("GET", "/elsewhere")).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body, "No route for /elsewhere");
        assert!(resp.get_header("X-Request-ID").is_some());
    }

    #[test]
    fn test_recoverable_mode_returns_signal() {
        let svc = service(RestConfig {
            signal_mode: SignalMode::Recoverable,
            ..RestConfig::default()
        });
        let err = svc.handle(RestRequest::new("GET", "/rest/nope")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_json_error_body() {
        let svc = service(RestConfig {
            error_body: ErrorBodyFormat::Json,
            ..RestConfig::default()
        });
        let resp = svc.handle(RestRequest::new("GET", "/rest/test/999")).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(
            resp.body,
            r#"{"name":"Not Found","msg":"Resource not found, ID: 999"}"#
        );
    }

    #[test]
    fn test_bodiless_signal_has_no_body() {
        let svc = service(RestConfig::default());
        let resp = svc
            .write_signal(RestResponse::new(), &Signal::status(StatusCode::NO_CONTENT));
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());
    }

    #[test]
    fn test_colliding_prefix_table_is_rejected() {
        let mut config = RestConfig::default();
        config
            .prefixes
            .insert(crate::registry::Role::Exec, "rest_method_".to_string());
        assert!(RestService::new(config).is_err());
    }
}
