//! Patient record types.
//!
//! A [`Patient`] is the unit of storage: demographics, birth data, archive state and the full
//! list of rounds live in one record, keyed by [`PatientId`].

use crate::constants::DEFAULT_ADMISSION_SOURCE;
use crate::round::Round;
use chrono::{DateTime, NaiveDate, Utc};
use nicu_rules::{GestationalAge, Sex};
use nicu_types::{Kilograms, NonEmptyText};
use nicu_uuid::PatientId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Active,
    Discharged,
    Transferred,
    Deceased,
}

impl PatientStatus {
    pub fn is_active(self) -> bool {
        self == PatientStatus::Active
    }

    pub fn label(self) -> &'static str {
        match self {
            PatientStatus::Active => "Active",
            PatientStatus::Discharged => "Discharged",
            PatientStatus::Transferred => "Transferred",
            PatientStatus::Deceased => "Deceased",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The states a patient can be archived into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    Discharged,
    Transferred,
    Deceased,
}

impl From<ArchiveStatus> for PatientStatus {
    fn from(status: ArchiveStatus) -> Self {
        match status {
            ArchiveStatus::Discharged => PatientStatus::Discharged,
            ArchiveStatus::Transferred => PatientStatus::Transferred,
            ArchiveStatus::Deceased => PatientStatus::Deceased,
        }
    }
}

/// Which patients a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatientFilter {
    #[default]
    Active,
    Archived,
    All,
}

impl PatientFilter {
    pub fn matches(self, status: PatientStatus) -> bool {
        match self {
            PatientFilter::Active => status.is_active(),
            PatientFilter::Archived => !status.is_active(),
            PatientFilter::All => true,
        }
    }
}

/// APGAR scores at 1, 5 and 10 minutes, each 0-10 when recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApgarScores {
    pub one_min: Option<u8>,
    pub five_min: Option<u8>,
    pub ten_min: Option<u8>,
}

impl ApgarScores {
    /// Recorded scores labelled by minute.
    pub fn recorded(&self) -> Vec<(u8, u8)> {
        [(1, self.one_min), (5, self.five_min), (10, self.ten_min)]
            .into_iter()
            .filter_map(|(minute, score)| score.map(|s| (minute, s)))
            .collect()
    }
}

fn default_admission_source() -> String {
    DEFAULT_ADMISSION_SOURCE.to_string()
}

fn default_status() -> PatientStatus {
    PatientStatus::Active
}

/// A stored patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub name: NonEmptyText,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub admission_date: NaiveDate,
    #[serde(default = "default_admission_source")]
    pub admission_source: String,
    #[serde(rename = "birthWeight")]
    pub birth_weight_kg: Kilograms,
    #[serde(default)]
    pub ga_weeks: Option<u8>,
    #[serde(default)]
    pub ga_days: u8,
    #[serde(default)]
    pub apgar_scores: ApgarScores,
    #[serde(default = "default_status")]
    pub status: PatientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "currentWeight",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_weight_kg: Option<Kilograms>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub rounds: Vec<Round>,
}

impl Patient {
    /// Gestational age at birth when weeks were recorded.
    pub fn gestational_age(&self) -> Option<GestationalAge> {
        self.ga_weeks
            .map(|weeks| GestationalAge::new(weeks, self.ga_days))
    }

    /// Recorded gestational weeks, widened for the rules engine.
    pub fn ga_weeks(&self) -> Option<u32> {
        self.ga_weeks.map(u32::from)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Most recent weight: current weight when measured, otherwise birth weight.
    pub fn latest_weight(&self) -> Kilograms {
        self.current_weight_kg.unwrap_or(self.birth_weight_kg)
    }

    /// Rounds are appended in chronological order, so the last one is the most recent.
    pub fn latest_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    /// Overwrites the editable demographic fields with those of `edited`.
    ///
    /// Identity, creation time, archive state, current weight and rounds are left untouched.
    pub(crate) fn apply_demographics(&mut self, edited: Patient) {
        self.name = edited.name;
        self.sex = edited.sex;
        self.date_of_birth = edited.date_of_birth;
        self.admission_date = edited.admission_date;
        self.admission_source = edited.admission_source;
        self.birth_weight_kg = edited.birth_weight_kg;
        self.ga_weeks = edited.ga_weeks;
        self.ga_days = edited.ga_days;
        self.apgar_scores = edited.apgar_scores;
    }
}

/// Admission details for a patient that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: NonEmptyText,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub admission_date: NaiveDate,
    /// `None` or blank records "Not specified".
    pub admission_source: Option<String>,
    pub birth_weight_kg: Kilograms,
    pub gestational_age: Option<GestationalAge>,
    pub apgar_scores: ApgarScores,
}

impl NewPatient {
    pub(crate) fn into_patient(self, id: PatientId, created_at: DateTime<Utc>) -> Patient {
        let admission_source = self
            .admission_source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_admission_source);

        Patient {
            id,
            name: self.name,
            sex: self.sex,
            date_of_birth: self.date_of_birth,
            admission_date: self.admission_date,
            admission_source,
            birth_weight_kg: self.birth_weight_kg,
            ga_weeks: self.gestational_age.map(|ga| ga.weeks),
            ga_days: self.gestational_age.map_or(0, |ga| ga.days),
            apgar_scores: self.apgar_scores,
            status: PatientStatus::Active,
            archive_reason: None,
            archived_at: None,
            current_weight_kg: None,
            created_at,
            rounds: Vec::new(),
        }
    }
}

/// Input to [`crate::RecordStore::upsert_patient`].
#[derive(Debug, Clone, PartialEq)]
pub enum PatientUpsert {
    /// Admit a new patient; the store assigns the id and creation time.
    New(NewPatient),
    /// Edit the demographics of an existing patient, matched by id.
    Existing(Patient),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_patient() -> NewPatient {
        NewPatient {
            name: NonEmptyText::new("Baby Amani").unwrap(),
            sex: Sex::Female,
            date_of_birth: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            admission_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            admission_source: Some("  ".into()),
            birth_weight_kg: Kilograms::new(1.45).unwrap(),
            gestational_age: Some(GestationalAge::new(31, 4)),
            apgar_scores: ApgarScores {
                one_min: Some(5),
                five_min: Some(8),
                ten_min: None,
            },
        }
    }

    #[test]
    fn new_patient_defaults() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let patient = new_patient().into_patient(PatientId::new(), created);
        assert_eq!(patient.admission_source, DEFAULT_ADMISSION_SOURCE);
        assert_eq!(patient.status, PatientStatus::Active);
        assert_eq!(patient.gestational_age(), Some(GestationalAge::new(31, 4)));
        assert_eq!(patient.latest_weight(), patient.birth_weight_kg);
        assert!(patient.rounds.is_empty());
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let patient = new_patient().into_patient(PatientId::new(), created);
        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["birthWeight"], 1.45);
        assert_eq!(value["gaWeeks"], 31);
        assert_eq!(value["gaDays"], 4);
        assert_eq!(value["dateOfBirth"], "2026-03-01");
        assert_eq!(value["apgarScores"]["oneMin"], 5);
        assert_eq!(value["status"], "active");
        assert_eq!(value["sex"], "F");
        assert!(value.get("archivedAt").is_none());
    }

    #[test]
    fn filter_matches_status() {
        assert!(PatientFilter::Active.matches(PatientStatus::Active));
        assert!(!PatientFilter::Active.matches(PatientStatus::Deceased));
        assert!(PatientFilter::Archived.matches(PatientStatus::Transferred));
        assert!(!PatientFilter::Archived.matches(PatientStatus::Active));
        assert!(PatientFilter::All.matches(PatientStatus::Discharged));
    }

    #[test]
    fn recorded_apgar_scores_skip_missing() {
        let scores = ApgarScores {
            one_min: Some(3),
            five_min: None,
            ten_min: Some(7),
        };
        assert_eq!(scores.recorded(), vec![(1, 3), (10, 7)]);
    }
}
