//! Static gazetteer: normalized place names mapped to known coordinates.
//!
//! The table is data, not code. The built-in copy is compiled in from
//! `data/gazetteer.json` and parsed once per process; a replacement table can
//! be loaded from any file with the same shape:
//!
//! ```json
//! [ { "key": "minneapolis", "lat": 44.9778, "lng": -93.2650 }, ... ]
//! ```
//!
//! Entry order matters. Substring matching takes the first qualifying entry,
//! so cities are listed before the states and countries that contain them.

use super::types::Coordinate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

const BUILTIN_TABLE: &str = include_str!("../../data/gazetteer.json");

static BUILTIN: LazyLock<Arc<Gazetteer>> = LazyLock::new(|| {
    let table = Gazetteer::from_json_str(BUILTIN_TABLE).unwrap_or_else(|e| {
        tracing::error!(error = %e, "built-in gazetteer failed to load; continuing with an empty table");
        Gazetteer::default()
    });
    Arc::new(table)
});

#[derive(Debug, thiserror::Error)]
pub enum GazetteerError {
    #[error("cannot read gazetteer file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed gazetteer data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gazetteer entry {index} has an empty key")]
    EmptyKey { index: usize },
    #[error("gazetteer entry '{key}' has out-of-range coordinates ({lat}, {lng})")]
    OutOfRange { key: String, lat: f64, lng: f64 },
    #[error("duplicate gazetteer key '{0}'")]
    DuplicateKey(String),
}

#[derive(Deserialize)]
struct RawEntry {
    key: String,
    lat: f64,
    lng: f64,
}

/// Read-only, insertion-ordered place table.
#[derive(Debug, Default)]
pub struct Gazetteer {
    entries: Vec<(String, Coordinate)>,
    index: HashMap<String, usize>,
}

impl Gazetteer {
    /// The embedded table, shared by every caller in the process.
    pub fn builtin() -> Arc<Gazetteer> {
        Arc::clone(&BUILTIN)
    }

    pub fn from_json_str(data: &str) -> Result<Self, GazetteerError> {
        let raw: Vec<RawEntry> = serde_json::from_str(data)?;
        let mut entries = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());

        for (i, entry) in raw.into_iter().enumerate() {
            let key = normalize(&entry.key);
            if key.is_empty() {
                return Err(GazetteerError::EmptyKey { index: i });
            }
            let coord = Coordinate::checked(entry.lat, entry.lng).ok_or_else(|| {
                GazetteerError::OutOfRange {
                    key: key.clone(),
                    lat: entry.lat,
                    lng: entry.lng,
                }
            })?;
            if index.contains_key(&key) {
                return Err(GazetteerError::DuplicateKey(key));
            }
            index.insert(key.clone(), entries.len());
            entries.push((key, coord));
        }

        Ok(Self { entries, index })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| GazetteerError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Exact lookup. `key` must already be normalized.
    pub fn lookup_exact(&self, key: &str) -> Option<Coordinate> {
        self.index.get(key).map(|&i| self.entries[i].1)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Coordinate)> + '_ {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    /// Exact match first, then the first entry where either string contains
    /// the other. Plain substrings: "indianapolis" contains "india".
    pub fn find(&self, query: &str) -> Option<(&str, Coordinate)> {
        let q = normalize(query);
        if q.is_empty() {
            return None;
        }

        if let Some(&i) = self.index.get(&q) {
            let (key, coord) = &self.entries[i];
            return Some((key.as_str(), *coord));
        }

        self.entries()
            .find(|(key, _)| q.contains(key) || key.contains(q.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lower-case and trim. Punctuation is kept.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
