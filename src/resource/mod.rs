//! # Resources
//!
//! A resource is a plain data handler. It declares the verbs it answers as a
//! [`MethodSet`] and implements one operation per declared verb. The dispatcher
//! turns the declaration into method capabilities through the registry, so the
//! allowed-method check and the `Allow` header never look at the trait itself.
//!
//! Operations either return the result directly or leave it in the resource
//! and return `Ok(None)`, in which case [`Resource::values`] is read back.
//! Returning `Err(Signal)` ends the dispatch with that status (`204` after a
//! delete, `201` after a create, `404` for a missing record).
//!
//! Two optional hooks run before the operation:
//!
//! - [`Resource::cors`] may call `RestContext::apply_cors`;
//! - [`Resource::authorize`] returning `false` ends the dispatch with `401`.
//!
//! ```rust
//! use brrtrest::dispatcher::RestContext;
//! use brrtrest::method::{MethodSet, RestMethod};
//! use brrtrest::resource::{ExecResult, Resource};
//! use serde_json::json;
//!
//! struct Clock;
//!
//! impl Resource for Clock {
//!     fn methods(&self) -> MethodSet {
//!         MethodSet::empty().with(RestMethod::Get)
//!     }
//!
//!     fn get(&mut self, _ctx: &mut RestContext) -> ExecResult {
//!         Ok(Some(json!({ "now": "12:00" })))
//!     }
//! }
//! ```

mod catalog;
pub mod demo;

pub use catalog::{HandlerSource, ResourceCatalog, ResourceFactory};
pub use demo::{TestResource, TestStore};

use serde_json::Value;

use crate::content::ContentType;
use crate::dispatcher::RestContext;
use crate::method::{MethodSet, RestMethod};
use crate::registry::{CapabilityRegistry, CapabilitySet};
use crate::signal::{Message, Signal};

/// Outcome of a resource operation.
pub type ExecResult = Result<Option<Value>, Signal>;

fn not_implemented(ctx: &RestContext, method: RestMethod) -> ExecResult {
    Err(Signal::internal(
        Message::new("Resource :resource declares :method but does not implement it.")
            .param(":resource", ctx.resource_name())
            .param(":method", method),
    ))
}

/// A data handler the dispatcher can invoke.
pub trait Resource: Send {
    /// Verbs this resource answers. An empty set fails the resource contract.
    fn methods(&self) -> MethodSet;

    fn get(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Get)
    }

    fn put(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Put)
    }

    fn post(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Post)
    }

    fn delete(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Delete)
    }

    fn head(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Head)
    }

    fn trace(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Trace)
    }

    fn patch(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Patch)
    }

    fn options(&mut self, ctx: &mut RestContext) -> ExecResult {
        not_implemented(ctx, RestMethod::Options)
    }

    /// Result left behind by an operation that returned `Ok(None)`.
    fn values(&self) -> Option<Value> {
        None
    }

    /// CORS hook.
    fn cors(&mut self, _ctx: &mut RestContext) -> Result<(), Signal> {
        Ok(())
    }

    /// Auth hook; `false` denies the request.
    fn authorize(&mut self, _ctx: &RestContext) -> bool {
        true
    }
}

/// The hosting endpoint: which representations it can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    types: Vec<ContentType>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::standard()
    }
}

impl Endpoint {
    pub fn new(types: impl IntoIterator<Item = ContentType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    /// HTML, JSON, XML and CSV.
    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            ContentType::Html,
            ContentType::Json,
            ContentType::Xml,
            ContentType::Csv,
        ])
    }

    #[must_use]
    pub fn types(&self) -> &[ContentType] {
        &self.types
    }

    /// Content capabilities declared by this endpoint.
    #[must_use]
    pub fn capabilities(&self, registry: &CapabilityRegistry) -> CapabilitySet {
        registry.content_capabilities(&self.types)
    }
}
