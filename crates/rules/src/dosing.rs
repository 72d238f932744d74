//! Weight-based dosing and the NICU medication table.

use crate::{round_to, RulesError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Single and daily dose in mg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dose {
    pub single_dose: f64,
    pub daily_dose: f64,
}

/// Dose for `weight_kg` at `mg_per_kg`, given `frequency` times a day.
///
/// The single dose is rounded to 2 dp first and the daily dose is derived from the rounded
/// single dose, then rounded again.
pub fn calculate_weight_based_dose(weight_kg: f64, mg_per_kg: f64, frequency: u32) -> Dose {
    let single_dose = round_to(weight_kg * mg_per_kg, 2);
    Dose {
        single_dose,
        daily_dose: round_to(single_dose * f64::from(frequency), 2),
    }
}

/// Medications with a fixed NICU dosing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medication {
    Ampicillin,
    Gentamicin,
    Ceftriaxone,
    Ciprofloxacin,
    PhenobarbitalLoading,
    PhenobarbitalMaintenance,
    UrsodeoxycholicAcid,
}

/// How a medication is given at a particular age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Regimen {
    pub mg_per_kg: f64,
    /// Doses per day.
    pub frequency: u32,
    pub schedule: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

impl Regimen {
    const fn new(mg_per_kg: f64, frequency: u32, schedule: &'static str) -> Self {
        Self {
            mg_per_kg,
            frequency,
            schedule,
            warning: None,
        }
    }
}

/// A computed dose together with the regimen it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationDose {
    pub medication: Medication,
    pub regimen: Regimen,
    pub dose: Dose,
}

/// Age in days up to which the first-week regimen applies.
const FIRST_WEEK_DAYS: i64 = 7;

impl Medication {
    pub const ALL: [Medication; 7] = [
        Medication::Ampicillin,
        Medication::Gentamicin,
        Medication::Ceftriaxone,
        Medication::Ciprofloxacin,
        Medication::PhenobarbitalLoading,
        Medication::PhenobarbitalMaintenance,
        Medication::UrsodeoxycholicAcid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Medication::Ampicillin => "Ampicillin",
            Medication::Gentamicin => "Gentamicin",
            Medication::Ceftriaxone => "Ceftriaxone",
            Medication::Ciprofloxacin => "Ciprofloxacin",
            Medication::PhenobarbitalLoading => "Phenobarbital (loading)",
            Medication::PhenobarbitalMaintenance => "Phenobarbital (maintenance)",
            Medication::UrsodeoxycholicAcid => "Ursodeoxycholic acid",
        }
    }

    /// Short identifier used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Medication::Ampicillin => "ampicillin",
            Medication::Gentamicin => "gentamicin",
            Medication::Ceftriaxone => "ceftriaxone",
            Medication::Ciprofloxacin => "ciprofloxacin",
            Medication::PhenobarbitalLoading => "phenobarbital-loading",
            Medication::PhenobarbitalMaintenance => "phenobarbital-maintenance",
            Medication::UrsodeoxycholicAcid => "ursodeoxycholic-acid",
        }
    }

    pub fn regimen(self, age_days: i64) -> Regimen {
        let first_week = age_days <= FIRST_WEEK_DAYS;
        match self {
            Medication::Ampicillin if first_week => Regimen::new(50.0, 2, "12 hourly"),
            Medication::Ampicillin => Regimen::new(100.0, 2, "12 hourly"),
            Medication::Gentamicin if first_week => Regimen::new(4.0, 1, "once daily"),
            Medication::Gentamicin => Regimen::new(5.0, 1, "once daily"),
            Medication::Ceftriaxone => Regimen {
                warning: Some("CONTRAINDICATED with jaundice/hyperbilirubinemia"),
                ..Regimen::new(50.0, 1, "once daily")
            },
            Medication::Ciprofloxacin => Regimen::new(10.0, 2, "12 hourly"),
            Medication::PhenobarbitalLoading => Regimen::new(20.0, 1, "single loading dose"),
            Medication::PhenobarbitalMaintenance => Regimen::new(5.0, 1, "once daily"),
            Medication::UrsodeoxycholicAcid => Regimen::new(10.0, 2, "12 hourly"),
        }
    }

    pub fn dose(self, weight_kg: f64, age_days: i64) -> MedicationDose {
        let regimen = self.regimen(age_days);
        MedicationDose {
            medication: self,
            regimen,
            dose: calculate_weight_based_dose(weight_kg, regimen.mg_per_kg, regimen.frequency),
        }
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Medication {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        Medication::ALL
            .into_iter()
            .find(|m| m.key() == wanted)
            .ok_or_else(|| RulesError::UnknownMedication(s.to_string()))
    }
}
