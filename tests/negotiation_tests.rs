//! Header negotiation, standalone and through the dispatcher.

mod common;

use std::sync::Arc;

use brrtrest::config::RestConfig;
use brrtrest::dispatcher::Dispatcher;
use brrtrest::negotiation::{HeaderNegotiator, RequestNegotiator};
use brrtrest::registry::{CapabilityRegistry, RegistryError};
use brrtrest::resource::{Endpoint, HandlerSource, Resource, ResourceCatalog, TestResource, TestStore};
use brrtrest::server::{RestRequest, RestService};
use brrtrest::ContentType;
use common::{send, service, service_with};
use http::StatusCode;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_accept_picks_highest_quality() {
    let n = RequestNegotiator::new(
        Some("text/html;q=0.2, application/xml;q=0.9, */*;q=0.1"),
        None,
        None,
    );
    let supported = strings(&["text/html", "application/json", "application/xml"]);
    assert_eq!(n.preferred_accept(&supported).as_deref(), Some("application/xml"));
}

#[test]
fn test_specific_range_overrides_wildcard() {
    let n = RequestNegotiator::new(Some("application/*;q=0.5, application/json;q=0"), None, None);
    let supported = strings(&["application/json", "application/xml"]);
    assert_eq!(n.preferred_accept(&supported).as_deref(), Some("application/xml"));
}

#[test]
fn test_nan_quality_does_not_win() {
    let n = RequestNegotiator::new(Some("application/xml;q=NaN, application/json;q=0.3"), None, None);
    let supported = strings(&["application/xml", "application/json"]);
    assert_eq!(n.preferred_accept(&supported).as_deref(), Some("application/json"));
}

#[test]
fn test_no_member_matches() {
    let n = RequestNegotiator::new(Some("image/png"), Some("iso-8859-1"), Some("fr"));
    assert_eq!(n.preferred_accept(&strings(&["application/json"])), None);
    assert_eq!(n.preferred_charset(&strings(&["utf-8"])), None);
    assert_eq!(n.preferred_language(&strings(&["en-us"])), None);
}

#[test]
fn test_absent_headers_take_first_candidate() {
    let n = RequestNegotiator::default();
    assert_eq!(
        n.preferred_accept(&strings(&["text/html", "application/json"])).as_deref(),
        Some("text/html")
    );
    assert_eq!(n.preferred_charset(&[]), None);
}

#[test]
fn test_language_prefix_and_wildcard() {
    let n = RequestNegotiator::new(None, None, Some("de;q=0.9, en"));
    let supported = strings(&["de-de", "en-us"]);
    assert_eq!(n.preferred_language(&supported).as_deref(), Some("en-us"));

    let n = RequestNegotiator::new(None, Some("*"), Some("*"));
    assert_eq!(n.preferred_charset(&strings(&["utf-8"])).as_deref(), Some("utf-8"));
    assert_eq!(n.preferred_language(&strings(&["en-us"])).as_deref(), Some("en-us"));
}

#[test]
fn test_charset_not_acceptable() {
    let svc = service();
    let resp = send(
        &svc,
        RestRequest::new("GET", "/rest/test/1.json").with_header("Accept-Charset", "iso-8859-1"),
    );
    assert_eq!(resp.status, 406);
    assert_eq!(
        resp.body,
        "Supplied Accept-Charset: iso-8859-1 not supported. Supported types: utf-8"
    );
}

#[test]
fn test_language_not_acceptable() {
    let svc = service();
    let resp = send(
        &svc,
        RestRequest::new("GET", "/rest/test/1.json").with_header("Accept-Language", "fr"),
    );
    assert_eq!(resp.status, 406);
    assert_eq!(
        resp.body,
        "Supplied Accept-Language: fr not supported. Supported languages: en-us"
    );
}

#[test]
fn test_configured_charsets_and_languages() {
    let svc = service_with(RestConfig {
        charsets: vec!["utf-8".into(), "iso-8859-1".into()],
        languages: vec!["en-us".into(), "de-de".into()],
        ..RestConfig::default()
    });
    let resp = send(
        &svc,
        RestRequest::new("GET", "/rest/test/1.json")
            .with_header("Accept-Charset", "iso-8859-1, utf-8;q=0.5")
            .with_header("Accept-Language", "de"),
    );
    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.get_header("Content-Type"),
        Some("application/json; charset=iso-8859-1")
    );
    assert_eq!(resp.get_header("Content-Language"), Some("de-de"));
}

#[test]
fn test_configured_types_restrict_accept() {
    let svc = service_with(RestConfig {
        types: Some(vec!["application/json".into()]),
        ..RestConfig::default()
    });
    let resp = send(
        &svc,
        RestRequest::new("GET", "/rest/test/1").with_header("Accept", "text/html"),
    );
    assert_eq!(resp.status, 406);

    let resp = send(&svc, RestRequest::new("GET", "/rest/test/1"));
    assert_eq!(
        resp.get_header("Content-Type"),
        Some("application/json; charset=utf-8")
    );
}

#[test]
fn test_unrenderable_configured_type_fails_at_startup() {
    let err = RestService::new(RestConfig {
        types: Some(vec!["application/json".into(), "text/plain".into()]),
        ..RestConfig::default()
    })
    .unwrap_err();
    assert_eq!(err, RegistryError::UnknownContentType("text/plain".into()));
}

/// Fixed answers, whatever the request says.
struct Fixed;

impl HeaderNegotiator for Fixed {
    fn preferred_accept(&self, candidates: &[String]) -> Option<String> {
        candidates.iter().find(|c| c.as_str() == "application/xml").cloned()
    }

    fn preferred_charset(&self, candidates: &[String]) -> Option<String> {
        candidates.first().cloned()
    }

    fn preferred_language(&self, _candidates: &[String]) -> Option<String> {
        None
    }
}

#[test]
fn test_custom_negotiator() {
    let registry = CapabilityRegistry::new();
    let store = TestStore::seeded();
    let catalog = ResourceCatalog::new(registry.clone()).with("test", move || {
        Box::new(TestResource::new(store.clone())) as Box<dyn Resource>
    });
    let mut d = Dispatcher::with_negotiator(
        RestRequest::new("GET", "/rest/test").with_header("Accept", "application/json"),
        Arc::new(RestConfig::default()),
        &registry,
        Box::new(Fixed),
    );
    d.resolve_method().unwrap();
    d.resolve_handler(HandlerSource::Named("test".into()), &catalog)
        .unwrap();
    assert_eq!(d.resolve_content(&Endpoint::standard()).unwrap(), ContentType::Xml);
    assert_eq!(d.resolve_charset().unwrap(), "utf-8");
    let err = d.resolve_language().unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_ACCEPTABLE);
}
