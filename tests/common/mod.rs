//! Shared helpers for integration tests.
#![allow(dead_code)]

use brrtrest::config::RestConfig;
use brrtrest::resource::TestStore;
use brrtrest::server::{RestRequest, RestResponse, RestService};

/// Default configuration with the demo `test` resource over a fresh store.
pub fn service() -> RestService {
    service_with(RestConfig::default())
}

pub fn service_with(config: RestConfig) -> RestService {
    RestService::new(config)
        .expect("default prefix table is valid")
        .with_demo(TestStore::seeded(), None)
}

/// Dispatch in immediate mode; signals come back as responses.
pub fn send(service: &RestService, request: RestRequest) -> RestResponse {
    service
        .handle(request)
        .expect("immediate mode always answers with a response")
}

pub fn get_json(service: &RestService, path: &str) -> RestResponse {
    send(
        service,
        RestRequest::new("GET", path).with_header("Accept", "application/json"),
    )
}
