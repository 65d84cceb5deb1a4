//! Location resolution for gathermap.
//!
//! Turns free-text place names into map coordinates using an optional remote
//! geocoder, a built-in gazetteer, and a default point as the last resort.

pub mod gazetteer;
pub mod place_id;
pub mod providers;
pub mod resolver;
pub mod types;

pub use gazetteer::{Gazetteer, GazetteerError};
pub use place_id::decode_place_id;
pub use providers::{GeocodingProvider, NominatimSuggester, OpenCageProvider, PlaceSuggestion, ProviderHit};
pub use resolver::{CoordinateResolver, ResolverConfig, DEFAULT_COORDINATE, MIN_QUERY_LEN};
pub use types::{Coordinate, Provenance, ProviderError, Resolution};
