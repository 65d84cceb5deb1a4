//! Decoding of place identifiers handed out by the suggestion endpoint.
//!
//! Identifiers carry their coordinates inline (`nominatim_<lat>_<lng>`), so a
//! selected suggestion resolves without another network call.

use super::types::{Coordinate, Provenance, Resolution};

/// Returned for unknown or malformed identifiers.
pub const PLACE_ID_DEFAULT: Coordinate = Coordinate::new(44.9778, -93.2650);

const MOCK_PLACES: &[(&str, Coordinate)] = &[
    ("mock_1", Coordinate::new(44.9778, -93.265)),
    ("mock_2", Coordinate::new(20.5937, 78.9629)),
    ("mock_3", Coordinate::new(55.3781, -3.436)),
];

const COORD_PREFIXES: &[&str] = &["nominatim_", "positionstack_"];

pub fn decode_place_id(place_id: &str) -> Resolution {
    for prefix in COORD_PREFIXES {
        if let Some(rest) = place_id.strip_prefix(prefix) {
            if let Some(coordinate) = parse_pair(rest) {
                return Resolution {
                    coordinate,
                    provenance: Provenance::Provider,
                    matched: None,
                    formatted: None,
                };
            }
        }
    }

    if place_id.starts_with("mock_") {
        let coordinate = MOCK_PLACES
            .iter()
            .find(|(id, _)| *id == place_id)
            .map(|(_, c)| *c)
            .unwrap_or(PLACE_ID_DEFAULT);
        return Resolution {
            coordinate,
            provenance: Provenance::Gazetteer,
            matched: Some(place_id.to_string()),
            formatted: None,
        };
    }

    tracing::warn!(place_id, "unknown place_id format, using default point");
    Resolution::default_point(PLACE_ID_DEFAULT)
}

fn parse_pair(s: &str) -> Option<Coordinate> {
    let (lat, lng) = s.split_once('_')?;
    Coordinate::checked(lat.parse().ok()?, lng.parse().ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nominatim_id() {
        let r = decode_place_id("nominatim_44.97_-93.26");
        assert_eq!(r.provenance, Provenance::Provider);
        assert_relative_eq!(r.coordinate.lat, 44.97);
        assert_relative_eq!(r.coordinate.lng, -93.26);
    }

    #[test]
    fn test_positionstack_id() {
        let r = decode_place_id("positionstack_19.076_72.8777");
        assert_relative_eq!(r.coordinate.lng, 72.8777);
    }

    #[test]
    fn test_mock_ids() {
        assert_relative_eq!(decode_place_id("mock_2").coordinate.lat, 20.5937);
        assert_relative_eq!(decode_place_id("mock_3").coordinate.lng, -3.436);
        assert_eq!(decode_place_id("mock_m_1").coordinate, PLACE_ID_DEFAULT);
    }

    #[test]
    fn test_malformed_falls_back() {
        for id in ["nominatim_abc_def", "nominatim_95_10", "ChIJ123", ""] {
            let r = decode_place_id(id);
            assert_eq!(r.provenance, Provenance::Default, "{id}");
            assert_eq!(r.coordinate, PLACE_ID_DEFAULT);
        }
    }
}
