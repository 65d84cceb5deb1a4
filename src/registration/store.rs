//! File-backed registration store (default `data/signups.json`).

use super::types::{NewRegistration, Registration};
use crate::location::Resolution;
use crate::storage::JsonListFile;
use chrono::{SecondsFormat, Utc};
use std::path::PathBuf;

pub use crate::storage::StoreError;

pub struct RegistrationStore {
    file: JsonListFile,
}

impl RegistrationStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonListFile::new(path),
        }
    }

    /// All registrations in insertion order. A missing file is an empty store.
    pub fn list(&self) -> Result<Vec<Registration>, StoreError> {
        self.file.read()
    }

    /// Append a validated registration with its resolved coordinates.
    pub fn insert(
        &self,
        new: NewRegistration,
        resolution: &Resolution,
    ) -> Result<Registration, StoreError> {
        let _guard = self.file.lock()?;

        let mut all = self.list()?;
        let now = Utc::now();
        let mut id = now.timestamp_millis();
        while all.iter().any(|r| r.id == id.to_string()) {
            id += 1;
        }

        let record = Registration {
            id: id.to_string(),
            name: new.name,
            email: new.email,
            location: new.location,
            coordinates: Some(resolution.coordinate),
            provenance: Some(resolution.provenance),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        all.push(record.clone());
        self.file.write(&all)?;

        tracing::info!(
            id = %record.id,
            location = %record.location,
            provenance = %resolution.provenance,
            "registration stored"
        );
        Ok(record)
    }
}
