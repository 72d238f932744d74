//! Patient identifiers and round timestamps.
//!
//! Patients are keyed by a *canonical* UUID: **32 lowercase hexadecimal characters** with no
//! hyphens, the same text `Uuid::new_v4().simple().to_string()` produces. Identifiers coming
//! from outside the core (CLI arguments, imported bundles) must already be canonical; they are
//! never normalised. The one exception is stored data from the browser version of the tool,
//! whose `patient_<millis>_<suffix>` ids deserialise to a stable name-based id
//! ([`PatientId::from_legacy`]).
//!
//! Round entries are ordered by timestamp, so this crate also provides
//! [`next_round_timestamp`], which never hands out a timestamp at or before the previous one.

mod service;

pub use service::{next_round_timestamp, PatientId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type UuidResult<T> = Result<T, UuidError>;
