//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a coordinate only if both components are finite and in range.
    pub fn checked(lat: f64, lng: f64) -> Option<Self> {
        let c = Self { lat, lng };
        c.is_valid().then_some(c)
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Where a resolved coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Provider,
    Gazetteer,
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider => write!(f, "provider"),
            Self::Gazetteer => write!(f, "gazetteer"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A coordinate tagged with how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub provenance: Provenance,
    /// Gazetteer key that matched, for gazetteer-sourced results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    /// Formatted address returned by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl Resolution {
    pub fn default_point(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provenance: Provenance::Default,
            matched: None,
            formatted: None,
        }
    }

    pub fn from_gazetteer(key: &str, coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            provenance: Provenance::Gazetteer,
            matched: Some(key.to_string()),
            formatted: None,
        }
    }
}

/// Why a provider lookup did not produce a usable coordinate.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("provider returned no results")]
    NoResults,
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
