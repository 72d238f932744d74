//! # NICU Rules
//!
//! Clinical decision-support rules for neonatal rounds.
//!
//! Every function in this crate is a pure function of its arguments plus the static reference
//! tables compiled into it:
//! - [`age`]: day of life, day post admission, corrected age, gestational age display
//! - [`growth`]: maturity, birth-weight category and Fenton weight-for-gestational-age
//! - [`jaundice`]: high-risk assessment, Kramer-grade recommendations and investigations
//! - [`weight`]: weight change against birth weight and average daily gain
//! - [`dosing`]: weight-based doses and the NICU medication table
//! - [`fluids`]: maintenance fluid volumes by age
//! - [`vitals`]: normal vital-sign ranges and APGAR interpretation
//!
//! When a required input is missing (no gestational age, no sex) the result is `None`, meaning
//! "not applicable". Nothing here reads storage, logs, or formats markup.

pub mod age;
pub mod dosing;
pub mod fluids;
pub mod growth;
pub mod jaundice;
pub mod vitals;
pub mod weight;

pub use age::{
    corrected_age, day_count, day_of_life, day_post_admission, CorrectedAge, GestationalAge,
};
pub use dosing::{calculate_weight_based_dose, Dose, Medication, MedicationDose, Regimen};
pub use fluids::{calculate_maintenance_fluids, ml_per_kg_per_day, MaintenanceFluids};
pub use growth::{
    classify_birth_weight, classify_maturity, classify_weight_for_ga, BirthWeightCategory,
    GrowthCategory, GrowthReferenceTable, MaturityCategory, PercentileRow, Sex,
};
pub use jaundice::{
    assess_jaundice_risk, is_preterm, recommend_for_kramer_grade, recommend_investigations,
    AboGroup, BloodGroup, Investigation, InvestigationCategory, JaundiceAssessment, JaundiceRisk,
    KramerGrade, KramerRecommendation, RhFactor, RiskFlags, RiskReason, Urgency, KRAMER_ZONES,
};
pub use vitals::{
    check_vital, interpret_apgar, normal_vitals, ApgarInterpretation, NormalVitals,
    VitalAssessment, VitalRange, VitalReadings, VitalStatus,
};
pub use weight::{
    calculate_average_daily_gain, calculate_weight_change, grams_to_kg, kg_to_grams, DailyGain,
    GainStatus, WeightChange, WeightTrend,
};

/// Errors raised when parsing rule inputs from text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid Kramer grade {0} (expected 0-5)")]
    InvalidKramerGrade(u8),
    #[error("invalid blood group '{0}' (expected e.g. O+, A-, AB+)")]
    InvalidBloodGroup(String),
    #[error("invalid sex '{0}' (expected M or F)")]
    InvalidSex(String),
    #[error("unknown medication '{0}'")]
    UnknownMedication(String),
}

/// Rounds `value` to `places` decimal places, halves away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(0.10000000000000009, 2), 0.1);
        assert_eq!(round_to(4.000000000000004, 1), 4.0);
        assert_eq!(round_to(137.5, 0), 138.0);
        assert_eq!(round_to(-3.846, 1), -3.8);
    }
}
