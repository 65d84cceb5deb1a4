//! gathermap: event registration with location-to-coordinate resolution.
//!
//! Registrants submit a name, email and free-text location. The location is
//! resolved to a map coordinate (live geocoder, built-in gazetteer, or a
//! default point) and stored alongside the record for the map view.

pub mod comments;
pub mod config;
pub mod location;
pub mod registration;
pub mod server;
pub mod storage;
