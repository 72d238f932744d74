//! Normal vital-sign ranges and APGAR interpretation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive normal range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalRange {
    pub min: f64,
    pub max: f64,
}

impl VitalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl fmt::Display for VitalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalStatus {
    Low,
    Normal,
    High,
}

pub fn check_vital(value: f64, range: VitalRange) -> VitalStatus {
    if value < range.min {
        VitalStatus::Low
    } else if value > range.max {
        VitalStatus::High
    } else {
        VitalStatus::Normal
    }
}

/// Observed vital signs; any reading may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VitalReadings {
    pub heart_rate: Option<f64>,
    pub resp_rate: Option<f64>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<f64>,
}

/// Status of each reading present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalAssessment {
    pub heart_rate: Option<VitalStatus>,
    pub resp_rate: Option<VitalStatus>,
    pub temperature: Option<VitalStatus>,
    pub spo2: Option<VitalStatus>,
}

impl VitalAssessment {
    /// `true` when any reading present is out of range.
    pub fn has_abnormal(&self) -> bool {
        [self.heart_rate, self.resp_rate, self.temperature, self.spo2]
            .into_iter()
            .flatten()
            .any(|s| s != VitalStatus::Normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalVitals {
    pub heart_rate: VitalRange,
    pub resp_rate: VitalRange,
    pub temperature: VitalRange,
    pub spo2: VitalRange,
}

impl NormalVitals {
    pub fn assess(&self, readings: &VitalReadings) -> VitalAssessment {
        VitalAssessment {
            heart_rate: readings.heart_rate.map(|v| check_vital(v, self.heart_rate)),
            resp_rate: readings.resp_rate.map(|v| check_vital(v, self.resp_rate)),
            temperature: readings.temperature_c.map(|v| check_vital(v, self.temperature)),
            spo2: readings.spo2.map(|v| check_vital(v, self.spo2)),
        }
    }
}

/// Normal ranges for a baby `age_days` old. Heart rate runs higher in the first week.
pub fn normal_vitals(age_days: i64) -> NormalVitals {
    let heart_rate = if age_days <= 7 {
        VitalRange::new(120.0, 160.0)
    } else {
        VitalRange::new(100.0, 150.0)
    };
    NormalVitals {
        heart_rate,
        resp_rate: VitalRange::new(30.0, 60.0),
        temperature: VitalRange::new(36.5, 37.5),
        spo2: VitalRange::new(90.0, 100.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApgarInterpretation {
    Normal,
    ModerateDistress,
    SevereDistress,
}

impl ApgarInterpretation {
    pub fn label(self) -> &'static str {
        match self {
            ApgarInterpretation::Normal => "Normal",
            ApgarInterpretation::ModerateDistress => "Moderate distress",
            ApgarInterpretation::SevereDistress => "Severe distress",
        }
    }
}

pub fn interpret_apgar(score: u8) -> ApgarInterpretation {
    match score {
        7.. => ApgarInterpretation::Normal,
        4..=6 => ApgarInterpretation::ModerateDistress,
        _ => ApgarInterpretation::SevereDistress,
    }
}
