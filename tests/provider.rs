//! OpenCage provider and resolver against a mock HTTP server.
//!
//! The provider is blocking, so calls run on `spawn_blocking`.

use gathermap::location::{
    Coordinate, CoordinateResolver, GeocodingProvider, NominatimSuggester, OpenCageProvider,
    Provenance, ProviderError, ResolverConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> OpenCageProvider {
    OpenCageProvider::new("test-key", server.uri(), Duration::from_secs(2))
}

fn resolver_with(server: &MockServer) -> Arc<CoordinateResolver> {
    Arc::new(
        CoordinateResolver::new(ResolverConfig::default()).with_provider(Arc::new(provider(server))),
    )
}

async fn resolve(resolver: &Arc<CoordinateResolver>, q: &str) -> gathermap::location::Resolution {
    let resolver = Arc::clone(resolver);
    let q = q.to_string();
    tokio::task::spawn_blocking(move || resolver.resolve_detailed(&q))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_provider_success_overrides_gazetteer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("q", "Chicago"))
        .and(query_param("key", "test-key"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"geometry": {"lat": 41.8755616, "lng": -87.6244212},
                         "formatted": "Chicago, Illinois, United States of America"}],
            "status": {"code": 200, "message": "OK"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let r = resolve(&resolver_with(&server), "Chicago").await;
    assert_eq!(r.provenance, Provenance::Provider);
    assert_eq!(r.coordinate, Coordinate::new(41.8755616, -87.6244212));
    assert_eq!(
        r.formatted.as_deref(),
        Some("Chicago, Illinois, United States of America")
    );
}

#[tokio::test]
async fn test_http_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "results": [], "status": {"code": 401, "message": "invalid API key"}
        })))
        .mount(&server)
        .await;

    let p = provider(&server);
    let err = tokio::task::spawn_blocking(move || p.lookup("Chicago"))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ProviderError::Status { code: 401, .. }));

    let r = resolve(&resolver_with(&server), "Chicago").await;
    assert_eq!(r.provenance, Provenance::Gazetteer);
    assert_eq!(r.coordinate, Coordinate::new(41.8781, -87.6298));
}

#[tokio::test]
async fn test_semantic_failure_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [], "status": {"code": 200, "message": "OK"}
        })))
        .mount(&server)
        .await;

    let r = resolve(&resolver_with(&server), "Nowhereland").await;
    assert_eq!(r.provenance, Provenance::Default);
    assert_eq!(r.coordinate, Coordinate::new(20.0, 0.0));
}

#[tokio::test]
async fn test_malformed_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let r = resolve(&resolver_with(&server), "Pune").await;
    assert_eq!(r.provenance, Provenance::Gazetteer);
    assert_eq!(r.matched.as_deref(), Some("pune"));
}

#[tokio::test]
async fn test_timeout_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let slow = OpenCageProvider::new("test-key", server.uri(), Duration::from_millis(200));
    let resolver = Arc::new(
        CoordinateResolver::new(ResolverConfig::default()).with_provider(Arc::new(slow)),
    );
    let r = resolve(&resolver, "Delhi").await;
    assert_eq!(r.provenance, Provenance::Gazetteer);
    assert_eq!(r.matched.as_deref(), Some("delhi"));
}

#[tokio::test]
async fn test_short_query_never_hits_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = resolver_with(&server);
    for q in ["", "x"] {
        let r = resolve(&resolver, q).await;
        assert_eq!(r.provenance, Provenance::Default);
    }
}

#[tokio::test]
async fn test_suggestions_from_nominatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Minneap"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"lat": "44.9772995", "lon": "-93.2654692",
             "display_name": "Minneapolis, Hennepin County, Minnesota, United States"},
            {"lat": "bogus", "lon": "0", "display_name": "Broken"}
        ])))
        .mount(&server)
        .await;

    let suggester = NominatimSuggester::new(server.uri(), Duration::from_secs(2));
    let out = tokio::task::spawn_blocking(move || suggester.suggest("Minneap"))
        .await
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].place_id, "nominatim_44.9772995_-93.2654692");
    assert_eq!(out[0].main_text, "Minneapolis");
}
