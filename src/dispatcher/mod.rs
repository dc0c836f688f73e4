//! # Dispatcher Module
//!
//! The dispatcher drives one request through the REST pipeline: it resolves
//! the method and the resource, negotiates the representation, checks the
//! method against the resource's capabilities, runs the CORS and auth hooks,
//! invokes the resource operation and serializes its result.
//!
//! ## Lifecycle
//!
//! ```text
//! Constructed → MethodResolved → HandlerResolved → ContentResolved
//!   → CharsetResolved → LanguageResolved → MethodAllowedChecked
//!   → CorsApplied → AuthChecked → Invoked → Finalized
//! ```
//!
//! Stages move forward one at a time. Each returns `Result<_, Signal>` and the
//! first signal halts the dispatch. Headers written before the halt (CORS,
//! `Allow`) stay on the response handed back by
//! [`Dispatcher::take_response`]. The method check runs after negotiation,
//! just before the hooks.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use brrtrest::config::RestConfig;
//! use brrtrest::dispatcher::Dispatcher;
//! use brrtrest::registry::CapabilityRegistry;
//! use brrtrest::resource::{Endpoint, HandlerSource, Resource, ResourceCatalog, TestResource, TestStore};
//! use brrtrest::server::RestRequest;
//!
//! let registry = CapabilityRegistry::new();
//! let store = TestStore::seeded();
//! let catalog = ResourceCatalog::new(registry.clone()).with("test", move || {
//!     Box::new(TestResource::new(store.clone())) as Box<dyn Resource>
//! });
//!
//! let request = RestRequest::new("GET", "/rest/test/3")
//!     .with_param("id", "3")
//!     .with_header("Accept", "application/json");
//! let mut dispatcher = Dispatcher::new(request, Arc::new(RestConfig::default()), &registry);
//! dispatcher
//!     .run(HandlerSource::Named("test".into()), &catalog, &Endpoint::standard())
//!     .unwrap();
//!
//! let response = dispatcher.take_response();
//! assert!(response.body.contains("\"title\":\"three\""));
//! ```
//!
//! ## Logging
//!
//! Every run is wrapped in a `dispatch` span carrying `request_id`, `method`
//! and `path`. Lookups log at `debug`, completion at `info`, refused requests
//! at `warn` and broken resource contracts at `error`.

mod context;
mod core;

pub use context::RestContext;
pub use core::{DispatchState, Dispatcher, CONTENT_OVERRIDE_PARAM, METHOD_OVERRIDE_HEADER};
