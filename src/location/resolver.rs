//! Coordinate resolver: orchestrates the fallback chain.
//!
//! Flow: short-input guard → provider (if configured) → gazetteer (exact,
//! then substring) → default point.
//!
//! Resolution never fails. Every degraded path is logged with its reason so
//! operators can tell live data from fallback data.

use super::gazetteer::Gazetteer;
use super::providers::GeocodingProvider;
use super::types::{Coordinate, Provenance, Resolution};
use std::sync::Arc;

/// Point returned when nothing else matches.
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(20.0, 0.0);

/// Queries shorter than this (in characters, after trimming) are not looked up.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    pub default_coordinate: Coordinate,
    pub min_query_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_coordinate: DEFAULT_COORDINATE,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

/// Stateless resolver; share it behind an `Arc`.
pub struct CoordinateResolver {
    config: ResolverConfig,
    provider: Option<Arc<dyn GeocodingProvider>>,
    gazetteer: Arc<Gazetteer>,
}

impl CoordinateResolver {
    /// Gazetteer-only resolver over the built-in table.
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            provider: None,
            gazetteer: Gazetteer::builtin(),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn GeocodingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_gazetteer(mut self, gazetteer: Arc<Gazetteer>) -> Self {
        self.gazetteer = gazetteer;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Best-guess coordinate for free text.
    pub fn resolve(&self, query: &str) -> Coordinate {
        self.resolve_detailed(query).coordinate
    }

    /// Like [`resolve`](Self::resolve), with provenance.
    pub fn resolve_detailed(&self, query: &str) -> Resolution {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_query_len {
            tracing::debug!(query, "query below minimum length, using default point");
            return Resolution::default_point(self.config.default_coordinate);
        }

        if let Some(provider) = &self.provider {
            match provider.lookup(query) {
                Ok(hit) => {
                    tracing::debug!(
                        query = trimmed,
                        provider = provider.name(),
                        lat = hit.coordinate.lat,
                        lng = hit.coordinate.lng,
                        "resolved via provider"
                    );
                    return Resolution {
                        coordinate: hit.coordinate,
                        provenance: Provenance::Provider,
                        matched: None,
                        formatted: hit.formatted,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        query = trimmed,
                        provider = provider.name(),
                        error = %e,
                        "provider lookup failed, falling back to gazetteer"
                    );
                }
            }
        }

        if let Some((key, coordinate)) = self.gazetteer.find(trimmed) {
            tracing::debug!(query = trimmed, matched = key, "resolved via gazetteer");
            return Resolution::from_gazetteer(key, coordinate);
        }

        tracing::info!(query = trimmed, "no gazetteer match, using default point");
        Resolution::default_point(self.config.default_coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::providers::ProviderHit;
    use crate::location::types::ProviderError;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider stub that counts calls and replays a canned answer.
    struct StubProvider {
        answer: fn() -> Result<ProviderHit, ProviderError>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(answer: fn() -> Result<ProviderHit, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeocodingProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn lookup(&self, query: &str) -> Result<ProviderHit, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(query.to_string());
            (self.answer)()
        }
    }

    fn offline() -> CoordinateResolver {
        CoordinateResolver::new(ResolverConfig::default())
    }

    #[test]
    fn test_short_input_returns_default_without_provider_call() {
        let stub = StubProvider::new(|| {
            Ok(ProviderHit {
                coordinate: Coordinate::new(1.0, 1.0),
                formatted: None,
            })
        });
        let resolver = offline().with_provider(stub.clone());

        for q in ["", "x", "   ", " y "] {
            let r = resolver.resolve_detailed(q);
            assert_eq!(r.provenance, Provenance::Default);
            assert_eq!(r.coordinate, DEFAULT_COORDINATE);
        }
        assert_eq!(stub.calls(), 0);
    }

    #[test]
    fn test_gazetteer_exact_without_provider() {
        let c = offline().resolve("Minneapolis");
        assert_relative_eq!(c.lat, 44.9778);
        assert_relative_eq!(c.lng, -93.2650);
    }

    #[test]
    fn test_unknown_place_returns_default() {
        let r = offline().resolve_detailed("Nowhereland");
        assert_eq!(r.provenance, Provenance::Default);
        assert_eq!(r.coordinate, DEFAULT_COORDINATE);
    }

    #[test]
    fn test_configured_default_point() {
        let resolver = CoordinateResolver::new(ResolverConfig {
            default_coordinate: Coordinate::new(44.9778, -93.2650),
            min_query_len: 3,
        });
        assert_eq!(resolver.resolve("ab"), Coordinate::new(44.9778, -93.2650));
        assert_eq!(resolver.resolve("Nowhereland"), Coordinate::new(44.9778, -93.2650));
    }

    #[test]
    fn test_provider_overrides_gazetteer() {
        let stub = StubProvider::new(|| {
            Ok(ProviderHit {
                coordinate: Coordinate::new(41.0, -87.0),
                formatted: Some("Chicago, Illinois, United States".into()),
            })
        });
        let resolver = offline().with_provider(stub.clone());

        let r = resolver.resolve_detailed("Chicago");
        assert_eq!(r.provenance, Provenance::Provider);
        assert_eq!(r.coordinate, Coordinate::new(41.0, -87.0));
        assert_ne!(r.coordinate, resolver.gazetteer().lookup_exact("chicago").unwrap());
        assert_eq!(stub.calls(), 1);
    }

    #[test]
    fn test_provider_receives_untrimmed_query() {
        let stub = StubProvider::new(|| Err(ProviderError::NoResults));
        let resolver = offline().with_provider(stub.clone());

        let r = resolver.resolve_detailed("  Chicago ");
        assert_eq!(*stub.seen.lock().unwrap(), vec!["  Chicago ".to_string()]);
        assert_eq!(r.provenance, Provenance::Gazetteer);
        assert_eq!(r.matched.as_deref(), Some("chicago"));
    }

    #[test]
    fn test_provider_failures_fall_back_to_gazetteer() {
        let failures: [fn() -> Result<ProviderHit, ProviderError>; 4] = [
            || Err(ProviderError::Transport("timed out".into())),
            || Err(ProviderError::Status { code: 401, message: "invalid key".into() }),
            || Err(ProviderError::NoResults),
            || Err(ProviderError::InvalidResponse("not json".into())),
        ];

        for answer in failures {
            let resolver = offline().with_provider(StubProvider::new(answer));
            let r = resolver.resolve_detailed("Mumbai");
            assert_eq!(r.provenance, Provenance::Gazetteer);
            assert_eq!(r.matched.as_deref(), Some("mumbai"));
            assert_relative_eq!(r.coordinate.lat, 19.0760);
        }
    }

    #[test]
    fn test_provider_failure_and_no_match_gives_default() {
        let resolver = offline().with_provider(StubProvider::new(|| Err(ProviderError::NoResults)));
        assert_eq!(resolver.resolve("Nowhereland"), DEFAULT_COORDINATE);
    }

    #[test]
    fn test_substring_fallback() {
        let r = offline().resolve_detailed("Austin Texas");
        assert_eq!(r.matched.as_deref(), Some("austin"));
        assert_relative_eq!(r.coordinate.lat, 30.2672);
    }

    #[test]
    fn test_custom_gazetteer() {
        let table = Gazetteer::from_json_str(
            r#"[{"key": "paris texas", "lat": 33.66, "lng": -95.55},
                {"key": "paris", "lat": 48.8566, "lng": 2.3522}]"#,
        )
        .unwrap();
        let resolver = offline().with_gazetteer(Arc::new(table));
        assert_relative_eq!(resolver.resolve("paris").lat, 48.8566);
        assert_relative_eq!(resolver.resolve("Paris, Texas").lat, 48.8566);
        assert_relative_eq!(resolver.resolve("paris texas").lat, 33.66);
    }

    #[test]
    fn test_idempotent() {
        let resolver = offline();
        for q in ["Bihar India", "Nowhereland", "tokyo", "x"] {
            assert_eq!(resolver.resolve_detailed(q), resolver.resolve_detailed(q));
        }
    }

    #[test]
    fn test_always_in_range() {
        let resolver = offline();
        for q in ["Mumbai", "Sydney", "buenos aires", "???", "12345", "Ürümqi"] {
            assert!(resolver.resolve(q).is_valid(), "{q}");
        }
    }
}
