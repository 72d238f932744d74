//! Daily round records.

use chrono::{DateTime, Utc};
use nicu_rules::{JaundiceAssessment, VitalReadings};
use nicu_types::Kilograms;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OxygenSupport {
    #[default]
    #[serde(rename = "RA")]
    RoomAir,
    #[serde(rename = "O2")]
    Oxygen,
    #[serde(rename = "CPAP")]
    Cpap,
    #[serde(rename = "Ventilator")]
    Ventilator,
}

impl OxygenSupport {
    pub fn label(self) -> &'static str {
        match self {
            OxygenSupport::RoomAir => "Room air",
            OxygenSupport::Oxygen => "Oxygen",
            OxygenSupport::Cpap => "CPAP",
            OxygenSupport::Ventilator => "Ventilator",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub heart_rate: Option<u16>,
    pub resp_rate: Option<u16>,
    #[serde(rename = "temperature")]
    pub temperature_c: Option<f64>,
    pub spo2: Option<u8>,
    #[serde(default)]
    pub oxygen_support: OxygenSupport,
}

impl Vitals {
    pub fn readings(&self) -> VitalReadings {
        VitalReadings {
            heart_rate: self.heart_rate.map(f64::from),
            resp_rate: self.resp_rate.map(f64::from),
            temperature_c: self.temperature_c,
            spo2: self.spo2.map(f64::from),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinColor {
    #[default]
    Normal,
    Pale,
    Cyanosed,
    Jaundiced,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    #[default]
    Active,
    Lethargic,
    Unresponsive,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeding {
    #[default]
    Breastfeeding,
    Ebm,
    Formula,
    Ngt,
    Iv,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalExam {
    #[serde(default)]
    pub skin_color: SkinColor,
    /// Free-text description when skin colour is `Other`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_description: Option<String>,
    /// Present only when the baby was assessed as jaundiced.
    #[serde(default)]
    pub jaundice: Option<JaundiceAssessment>,
    #[serde(default)]
    pub activity: Activity,
    #[serde(default)]
    pub feeding: Feeding,
    #[serde(default)]
    pub notes: String,
}

/// A round as stored. The timestamp is assigned by the store on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default, rename = "weight")]
    pub weight_kg: Option<Kilograms>,
    #[serde(default)]
    pub clinical: ClinicalExam,
    #[serde(default)]
    pub plan: String,
}

/// Round contents before the store stamps them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRound {
    pub vitals: Vitals,
    pub weight_kg: Option<Kilograms>,
    pub clinical: ClinicalExam,
    pub plan: String,
}

impl NewRound {
    pub(crate) fn stamp(self, timestamp: DateTime<Utc>) -> Round {
        Round {
            timestamp,
            vitals: self.vitals,
            weight_kg: self.weight_kg,
            clinical: self.clinical,
            plan: self.plan,
        }
    }
}
