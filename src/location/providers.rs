//! Remote location providers: OpenCage forward geocoding and Nominatim
//! place suggestions.

use super::types::{Coordinate, ProviderError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("gathermap/", env!("CARGO_PKG_VERSION"));

/// A single successful provider answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderHit {
    pub coordinate: Coordinate,
    pub formatted: Option<String>,
}

/// An external forward geocoder. One blocking lookup per call.
pub trait GeocodingProvider: Send + Sync {
    fn name(&self) -> &str;

    fn lookup(&self, query: &str) -> Result<ProviderHit, ProviderError>;
}

// ─── OpenCage ───────────────────────────────────────────────────

pub const OPENCAGE_BASE_URL: &str = "https://api.opencagedata.com";

#[derive(Deserialize, Debug)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
    status: OpenCageStatus,
}

#[derive(Deserialize, Debug)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
    #[serde(default)]
    formatted: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize, Debug)]
struct OpenCageStatus {
    code: u16,
    #[serde(default)]
    message: String,
}

/// OpenCage Data forward geocoder.
pub struct OpenCageProvider {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl OpenCageProvider {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

impl GeocodingProvider for OpenCageProvider {
    fn name(&self) -> &str {
        "opencage"
    }

    fn lookup(&self, query: &str) -> Result<ProviderHit, ProviderError> {
        let url = format!("{}/geocode/v1/json", self.base_url);
        let response = self
            .agent
            .get(&url)
            .query("q", query)
            .query("key", &self.api_key)
            .query("limit", "1")
            .query("no_annotations", "1")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => ProviderError::Status {
                    code,
                    message: resp.status_text().to_string(),
                },
                ureq::Error::Transport(t) => ProviderError::Transport(t.to_string()),
            })?;

        let body: OpenCageResponse = response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parse_opencage(body)
    }
}

fn parse_opencage(body: OpenCageResponse) -> Result<ProviderHit, ProviderError> {
    if body.status.code != 200 {
        return Err(ProviderError::Status {
            code: body.status.code,
            message: body.status.message,
        });
    }

    let first = body.results.into_iter().next().ok_or(ProviderError::NoResults)?;
    let coordinate = Coordinate::checked(first.geometry.lat, first.geometry.lng).ok_or_else(|| {
        ProviderError::InvalidResponse(format!(
            "coordinates out of range: {}, {}",
            first.geometry.lat, first.geometry.lng
        ))
    })?;

    Ok(ProviderHit {
        coordinate,
        formatted: first.formatted.filter(|s| !s.is_empty()),
    })
}

// ─── Nominatim suggestions ──────────────────────────────────────

pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Inputs shorter than this get a placeholder suggestion instead of a search.
pub const MIN_SUGGEST_LEN: usize = 2;

#[derive(Deserialize, Debug)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
}

/// An autocomplete suggestion for the registration form.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    pub main_text: String,
    pub secondary_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
}

pub struct NominatimSuggester {
    agent: ureq::Agent,
    base_url: String,
}

impl NominatimSuggester {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Up to five suggestions. Failures produce an empty list.
    pub fn suggest(&self, input: &str) -> Vec<PlaceSuggestion> {
        if input.chars().count() < MIN_SUGGEST_LEN {
            return vec![placeholder_suggestion(input)];
        }

        match self.search(input) {
            Ok(results) => results
                .into_iter()
                .filter_map(|r| to_suggestion(input, r))
                .collect(),
            Err(e) => {
                tracing::warn!(input, error = %e, "place suggestion lookup failed");
                Vec::new()
            }
        }
    }

    fn search(&self, input: &str) -> Result<Vec<NominatimResult>, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .agent
            .get(&url)
            .query("format", "json")
            .query("q", input)
            .query("limit", "5")
            .query("addressdetails", "1")
            .call()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        response
            .into_json()
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn placeholder_suggestion(input: &str) -> PlaceSuggestion {
    PlaceSuggestion {
        place_id: format!("mock_{}_1", input),
        description: format!("{}, MN, USA", input),
        main_text: input.to_string(),
        secondary_text: "MN, USA".to_string(),
        coordinates: None,
    }
}

fn to_suggestion(input: &str, r: NominatimResult) -> Option<PlaceSuggestion> {
    let lat: f64 = r.lat.parse().ok()?;
    let lng: f64 = r.lon.parse().ok()?;
    let coordinates = Coordinate::checked(lat, lng)?;

    let mut parts = r.display_name.split(", ");
    let main_text = parts
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(input)
        .to_string();
    let secondary_text = parts.collect::<Vec<_>>().join(", ");

    Some(PlaceSuggestion {
        place_id: format!("nominatim_{}_{}", r.lat, r.lon),
        description: r.display_name,
        main_text,
        secondary_text,
        coordinates: Some(coordinates),
    })
}
