//! Registrant records and their JSON-file store.

pub mod store;
pub mod types;

pub use store::{RegistrationStore, StoreError};
pub use types::{NewRegistration, Registration, RegistrationError};
