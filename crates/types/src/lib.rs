//! Validated primitive types shared across the NICU rounds workspace.
//!
//! Values of these types can only be constructed through checked constructors, so code that
//! receives one can rely on the invariant without re-checking it:
//! - [`NonEmptyText`]: trimmed text with at least one non-whitespace character
//! - [`Kilograms`]: a finite, strictly positive body weight

use std::fmt;

/// Errors raised when a primitive value fails validation.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TypeError {
    /// The input text was empty or whitespace only.
    #[error("text cannot be empty")]
    EmptyText,
    /// The weight was zero, negative, NaN or infinite.
    #[error("weight must be a positive number of kilograms, got {0}")]
    InvalidWeight(f64),
}

/// Text that is guaranteed to contain at least one non-whitespace character.
///
/// Leading and trailing whitespace is trimmed on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and wraps it, rejecting empty results.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for NonEmptyText {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A body weight in kilograms.
///
/// Always finite and greater than zero. Serialised as a bare number so stored records keep
/// the plain `birthWeight: 2.5` shape.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Kilograms(f64);

impl Kilograms {
    pub fn new(value: f64) -> Result<Self, TypeError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeError::InvalidWeight(value))
        }
    }

    /// Builds a weight from a gram count.
    pub fn from_grams(grams: f64) -> Result<Self, TypeError> {
        Self::new(grams / 1000.0)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn grams(self) -> f64 {
        self.0 * 1000.0
    }
}

impl fmt::Display for Kilograms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kg", self.0)
    }
}

impl serde::Serialize for Kilograms {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Kilograms {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Kilograms::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Baby of Amina  ").unwrap();
        assert_eq!(text.as_str(), "Baby of Amina");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   \t"), Err(TypeError::EmptyText));
        assert_eq!(NonEmptyText::new(""), Err(TypeError::EmptyText));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn kilograms_rejects_non_positive_and_non_finite() {
        assert!(Kilograms::new(0.0).is_err());
        assert!(Kilograms::new(-1.2).is_err());
        assert!(Kilograms::new(f64::NAN).is_err());
        assert!(Kilograms::new(f64::INFINITY).is_err());
        assert!(Kilograms::new(0.45).is_ok());
    }

    #[test]
    fn kilograms_gram_conversion() {
        let w = Kilograms::from_grams(1250.0).unwrap();
        assert_eq!(w.get(), 1.25);
        assert_eq!(w.grams(), 1250.0);
    }

    #[test]
    fn kilograms_serialises_as_plain_number() {
        let w = Kilograms::new(2.5).unwrap();
        assert_eq!(serde_json::to_string(&w).unwrap(), "2.5");
        let back: Kilograms = serde_json::from_str("2.5").unwrap();
        assert_eq!(back, w);
        assert!(serde_json::from_str::<Kilograms>("0").is_err());
    }
}
