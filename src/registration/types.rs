//! Registrant record types and input validation.

use crate::location::{Coordinate, Provenance};
use serde::{Deserialize, Serialize};

use super::store::StoreError;

/// A stored registrant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: String,
    /// Records written before geocoding was added carry no coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinate>,
    /// Older records predate provenance tracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    pub timestamp: String,
}

/// Submitted form data, before geocoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRegistration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl NewRegistration {
    /// Trim all fields and check they are present.
    pub fn validate(self) -> Result<Self, RegistrationError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let location = self.location.trim().to_string();

        if name.is_empty() {
            return Err(RegistrationError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(RegistrationError::MissingField("email"));
        }
        if location.is_empty() {
            return Err(RegistrationError::MissingField("location"));
        }
        if !email.contains('@') {
            return Err(RegistrationError::InvalidEmail);
        }

        Ok(Self { name, email, location })
    }
}
