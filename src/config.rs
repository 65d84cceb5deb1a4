//! Runtime configuration, read from the environment.
//!
//! The presence of `OPENCAGE_API_KEY` is the only switch between live
//! geocoding and gazetteer-only mode.

use crate::location::{
    providers::{NOMINATIM_BASE_URL, OPENCAGE_BASE_URL},
    Coordinate, ResolverConfig, DEFAULT_COORDINATE, MIN_QUERY_LEN,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
    #[error("default coordinate ({lat}, {lng}) is out of range")]
    DefaultOutOfRange { lat: f64, lng: f64 },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub data_file: PathBuf,
    pub comments_file: PathBuf,
    pub gazetteer_path: Option<PathBuf>,
    pub opencage_api_key: Option<String>,
    pub geocoder_url: String,
    pub suggest_url: String,
    pub geocoder_timeout: Duration,
    pub resolver: ResolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            data_file: PathBuf::from("data/signups.json"),
            comments_file: PathBuf::from("data/comments.json"),
            gazetteer_path: None,
            opencage_api_key: None,
            geocoder_url: OPENCAGE_BASE_URL.to_string(),
            suggest_url: NOMINATIM_BASE_URL.to_string(),
            geocoder_timeout: Duration::from_secs(5),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Load from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr = var("GATHERMAP_LISTEN_ADDR").unwrap_or(defaults.listen_addr);
        let data_file = var("GATHERMAP_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_file);
        let comments_file = var("GATHERMAP_COMMENTS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.comments_file);
        let gazetteer_path = var("GATHERMAP_GAZETTEER").map(PathBuf::from);
        let opencage_api_key = var("OPENCAGE_API_KEY");
        let geocoder_url = var("GATHERMAP_GEOCODER_URL").unwrap_or(defaults.geocoder_url);
        let suggest_url = var("GATHERMAP_SUGGEST_URL").unwrap_or(defaults.suggest_url);

        let timeout_secs: u64 = parse_var(&var, "GATHERMAP_GEOCODER_TIMEOUT_SECS", 5)?;
        let lat: f64 = parse_var(&var, "GATHERMAP_DEFAULT_LAT", DEFAULT_COORDINATE.lat)?;
        let lng: f64 = parse_var(&var, "GATHERMAP_DEFAULT_LNG", DEFAULT_COORDINATE.lng)?;
        let min_query_len: usize = parse_var(&var, "GATHERMAP_MIN_QUERY_LEN", MIN_QUERY_LEN)?;

        let default_coordinate =
            Coordinate::checked(lat, lng).ok_or(ConfigError::DefaultOutOfRange { lat, lng })?;

        Ok(Self {
            listen_addr,
            data_file,
            comments_file,
            gazetteer_path,
            opencage_api_key,
            geocoder_url,
            suggest_url,
            geocoder_timeout: Duration::from_secs(timeout_secs),
            resolver: ResolverConfig {
                default_coordinate,
                min_query_len,
            },
        })
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var: name, value }),
        None => Ok(default),
    }
}
