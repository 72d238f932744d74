//! Argument parsing and range checks for bedside input.
//!
//! Integer vitals are bounded with clap's ranged parsers where the arguments are declared;
//! decimal values and domain types go through the parsers here.

use clap::ValueEnum;
use nicu_core::{Activity, ArchiveStatus, Feeding, Kilograms, OxygenSupport, PatientFilter, SkinColor};
use nicu_rules::KramerGrade;

fn parse_decimal_in(s: &str, min: f64, max: f64, what: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{what} must be a number, got '{s}'"))?;
    if !(min..=max).contains(&value) {
        return Err(format!("{what} must be between {min} and {max}, got {value}"));
    }
    Ok(value)
}

fn parse_kilograms_in(s: &str, min: f64, max: f64, what: &str) -> Result<Kilograms, String> {
    let kg = parse_decimal_in(s, min, max, what)?;
    Kilograms::new(kg).map_err(|e| e.to_string())
}

/// Body temperature in °C, 30-42.
pub fn temperature(s: &str) -> Result<f64, String> {
    parse_decimal_in(s, 30.0, 42.0, "temperature")
}

/// Weight measured on a round, 0.3-8 kg.
pub fn round_weight(s: &str) -> Result<Kilograms, String> {
    parse_kilograms_in(s, 0.3, 8.0, "weight")
}

/// Birth weight, 0.3-6 kg.
pub fn birth_weight(s: &str) -> Result<Kilograms, String> {
    parse_kilograms_in(s, 0.3, 6.0, "birth weight")
}

/// Any positive weight, for calculators.
pub fn weight(s: &str) -> Result<Kilograms, String> {
    parse_kilograms_in(s, f64::MIN_POSITIVE, f64::MAX, "weight")
}

pub fn kramer_grade(s: &str) -> Result<KramerGrade, String> {
    let value: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("Kramer grade must be a whole number 0-5, got '{s}'"))?;
    KramerGrade::try_from(value).map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FilterArg {
    Active,
    Archived,
    All,
}

impl From<FilterArg> for PatientFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Active => PatientFilter::Active,
            FilterArg::Archived => PatientFilter::Archived,
            FilterArg::All => PatientFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArchiveArg {
    Discharged,
    Transferred,
    Deceased,
}

impl From<ArchiveArg> for ArchiveStatus {
    fn from(arg: ArchiveArg) -> Self {
        match arg {
            ArchiveArg::Discharged => ArchiveStatus::Discharged,
            ArchiveArg::Transferred => ArchiveStatus::Transferred,
            ArchiveArg::Deceased => ArchiveStatus::Deceased,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OxygenArg {
    #[value(alias = "ra")]
    RoomAir,
    #[value(alias = "o2")]
    Oxygen,
    Cpap,
    Ventilator,
}

impl From<OxygenArg> for OxygenSupport {
    fn from(arg: OxygenArg) -> Self {
        match arg {
            OxygenArg::RoomAir => OxygenSupport::RoomAir,
            OxygenArg::Oxygen => OxygenSupport::Oxygen,
            OxygenArg::Cpap => OxygenSupport::Cpap,
            OxygenArg::Ventilator => OxygenSupport::Ventilator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SkinArg {
    Normal,
    Pale,
    Cyanosed,
    Jaundiced,
    Other,
}

impl From<SkinArg> for SkinColor {
    fn from(arg: SkinArg) -> Self {
        match arg {
            SkinArg::Normal => SkinColor::Normal,
            SkinArg::Pale => SkinColor::Pale,
            SkinArg::Cyanosed => SkinColor::Cyanosed,
            SkinArg::Jaundiced => SkinColor::Jaundiced,
            SkinArg::Other => SkinColor::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActivityArg {
    Active,
    Lethargic,
    Unresponsive,
}

impl From<ActivityArg> for Activity {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Active => Activity::Active,
            ActivityArg::Lethargic => Activity::Lethargic,
            ActivityArg::Unresponsive => Activity::Unresponsive,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedingArg {
    Breastfeeding,
    Ebm,
    Formula,
    Ngt,
    Iv,
}

impl From<FeedingArg> for Feeding {
    fn from(arg: FeedingArg) -> Self {
        match arg {
            FeedingArg::Breastfeeding => Feeding::Breastfeeding,
            FeedingArg::Ebm => Feeding::Ebm,
            FeedingArg::Formula => Feeding::Formula,
            FeedingArg::Ngt => Feeding::Ngt,
            FeedingArg::Iv => Feeding::Iv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bounds() {
        assert_eq!(temperature("36.8"), Ok(36.8));
        assert_eq!(temperature("30"), Ok(30.0));
        assert!(temperature("29.9").is_err());
        assert!(temperature("42.1").is_err());
        assert!(temperature("warm").is_err());
    }

    #[test]
    fn weight_bounds_differ_for_birth_and_round() {
        assert!(round_weight("7.5").is_ok());
        assert!(birth_weight("7.5").is_err());
        assert!(birth_weight("0.29").is_err());
        assert_eq!(birth_weight("1.2").map(|w| w.get()), Ok(1.2));
    }

    #[test]
    fn calculator_weight_rejects_zero() {
        assert!(weight("0").is_err());
        assert!(weight("-1").is_err());
        assert!(weight("12").is_ok());
    }

    #[test]
    fn kramer_grade_parsing() {
        assert_eq!(kramer_grade("4"), Ok(KramerGrade::ArmsAndLowerLegs));
        assert!(kramer_grade("6").is_err());
        assert!(kramer_grade("x").is_err());
    }
}
