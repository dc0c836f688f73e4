//! Request/response types and the service boundary.
//!
//! Adapters for a concrete HTTP framework build a [`RestRequest`], call
//! [`RestService::handle`] and copy the [`RestResponse`] back out.

mod request;
mod response;
mod service;

pub use request::{parse_query_string, HeaderVec, RestRequest, MAX_INLINE_HEADERS};
pub use response::{status_reason, RestResponse};
pub use service::RestService;
