//! Identifier and timestamp implementation.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, Utc};
use std::{fmt, str::FromStr};

pub use ::uuid::Uuid;

/// Prefix of identifiers written by the browser version of the tool.
const LEGACY_PREFIX: &str = "patient_";

/// Namespace for the name-based ids that legacy identifiers map onto.
const LEGACY_NAMESPACE: Uuid = Uuid::from_u128(0x6e1c_7a0d_3b52_4f8e_9a41_2c5d_8e07_b913);

/// Canonical patient identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed the inner value is known to be canonical, so `Display` output can be used
/// directly as a storage key or CLI argument.
///
/// - [`PatientId::new`] allocates a fresh random (v4) identifier for a new admission.
/// - [`PatientId::parse`] validates an externally supplied identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatientId(Uuid);

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected rather than normalised, so every stored
    /// identifier has exactly one textual form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "patient id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("invalid patient id '{}': {}", input, e)))
    }

    /// Maps a legacy `patient_<millis>_<suffix>` identifier onto a canonical one.
    ///
    /// The mapping is a name-based (v5) UUID over the legacy text, so the same legacy id always
    /// yields the same `PatientId` and re-importing an old export updates the same records.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in the legacy form.
    pub fn from_legacy(input: &str) -> UuidResult<Self> {
        if !Self::is_legacy(input) {
            return Err(UuidError::InvalidInput(format!(
                "legacy patient id must look like 'patient_<millis>_<suffix>', got: '{}'",
                input
            )));
        }
        Ok(Self(Uuid::new_v5(&LEGACY_NAMESPACE, input.as_bytes())))
    }

    /// Purely syntactic check for the legacy `patient_<millis>_<suffix>` form.
    ///
    /// The suffix is base-36 text and may be shorter than usual or empty.
    pub fn is_legacy(input: &str) -> bool {
        let Some(rest) = input.strip_prefix(LEGACY_PREFIX) else {
            return false;
        };
        let Some((millis, suffix)) = rest.split_once('_') else {
            return false;
        };
        !millis.is_empty()
            && millis.bytes().all(|b| b.is_ascii_digit())
            && suffix
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z'))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Purely syntactic canonical-form check.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PatientId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if PatientId::is_legacy(&s) {
            return PatientId::from_legacy(&s).map_err(serde::de::Error::custom);
        }
        PatientId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Returns the timestamp for a new round entry.
///
/// The result is `now` unless that would not be strictly after `previous`, in which case it is
/// `previous + 1ms`. Rounds appended in quick succession (or after a clock step backwards)
/// therefore keep their insertion order when sorted by time.
pub fn next_round_timestamp(
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::milliseconds(1),
        _ => now,
    }
}
