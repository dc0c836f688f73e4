//! # brrtrest
//!
//! **brrtrest** is a content-negotiating REST dispatch layer. It sits between an
//! HTTP framework's controller layer and plain data-holding resources: it
//! resolves the method and the representation a client asked for, checks the
//! request against the resource's declared capabilities, runs the CORS and auth
//! hooks, invokes the resource and serializes the result as JSON, XML, CSV or
//! an HTML dump.
//!
//! It does not implement HTTP itself. Adapters build a
//! [`server::RestRequest`], call [`server::RestService::handle`] and copy the
//! [`server::RestResponse`] back to their framework.
//!
//! ## Architecture
//!
//! - **[`registry`]** - role prefixes and capability identifiers
//! - **[`method`]** / **[`content`]** - the eight verbs and the MIME table
//! - **[`negotiation`]** - `Accept`, `Accept-Charset`, `Accept-Language` with q-values
//! - **[`dispatcher`]** - the per-request state machine and [`dispatcher::RestContext`]
//! - **[`resource`]** - the [`resource::Resource`] trait, catalog and demo resource
//! - **[`serializers`]** - JSON, XML, CSV, HTML and ETag
//! - **[`signal`]** - the status taxonomy every stage fails with
//! - **[`cors`]** - CORS defaults, overrides and origin validation
//! - **[`server`]** - request/response types and the service boundary
//! - **[`router`]** - the `rest/<resource>(/<id>)(.<type>)` route
//! - **[`config`]** / **[`logging`]** / **[`ids`]** - process setup
//! - **[`cli`]** - the `brrtrest` binary
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Adapter
//!     participant Service as RestService
//!     participant Route as RestRoute
//!     participant Dispatcher
//!     participant Negotiator as HeaderNegotiator
//!     participant Resource
//!     participant Ser as serializers
//!
//!     Adapter->>Service: handle(RestRequest)
//!     Service->>Route: matches(path)
//!     Route-->>Service: resource, id, content_type
//!     Service->>Dispatcher: run(Named(resource))
//!     Dispatcher->>Dispatcher: resolve_method (X-HTTP-METHOD-OVERRIDE)
//!     Dispatcher->>Dispatcher: resolve_handler (model role)
//!     Dispatcher->>Negotiator: preferred_accept / charset / language
//!     alt no match
//!         Negotiator-->>Dispatcher: None
//!         Dispatcher-->>Service: Err(406)
//!     end
//!     Dispatcher->>Dispatcher: check_method_allowed (method role)
//!     Dispatcher->>Resource: cors / authorize
//!     Dispatcher->>Resource: get / put / post / ... (exec role)
//!     Resource-->>Dispatcher: result or Signal
//!     Dispatcher->>Ser: render(content, result)
//!     Dispatcher-->>Service: Ok / Err(Signal)
//!     Service-->>Adapter: RestResponse (immediate) or Err(Signal) (recoverable)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtrest::config::RestConfig;
//! use brrtrest::resource::TestStore;
//! use brrtrest::server::{RestRequest, RestService};
//!
//! let service = RestService::new(RestConfig::default())
//!     .unwrap()
//!     .with_demo(TestStore::seeded(), None);
//!
//! let response = service
//!     .handle(RestRequest::new("GET", "/rest/test/3.xml"))
//!     .unwrap();
//! assert_eq!(response.status, 200);
//! assert!(response.body.contains("<title>three</title>"));
//! ```

pub mod cli;
pub mod config;
pub mod content;
pub mod cors;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod method;
pub mod negotiation;
pub mod registry;
pub mod resource;
pub mod router;
pub mod serializers;
pub mod server;
pub mod signal;

pub use config::RestConfig;
pub use content::ContentType;
pub use dispatcher::{DispatchState, Dispatcher, RestContext};
pub use method::{MethodSet, RestMethod};
pub use registry::{CapabilityRegistry, Role};
pub use resource::{Endpoint, ExecResult, HandlerSource, Resource, ResourceCatalog};
pub use server::{RestRequest, RestResponse, RestService};
pub use signal::{Message, Signal, SignalMode};
