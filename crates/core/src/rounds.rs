//! Round recording and bedside summaries.
//!
//! [`RoundService`] joins the record store with the clinical rules: it derives the jaundice
//! assessment when a round is recorded, and computes the per-patient figures shown on rounds.
//! Callers pass `now` explicitly so that every figure in one summary uses the same instant.

use crate::patient::Patient;
use crate::round::{Activity, ClinicalExam, Feeding, NewRound, Round, SkinColor, Vitals};
use crate::store::RecordStore;
use crate::StoreResult;
use chrono::{DateTime, Utc};
use nicu_rules::{
    assess_jaundice_risk, calculate_average_daily_gain, calculate_maintenance_fluids,
    calculate_weight_change, classify_birth_weight, classify_maturity, classify_weight_for_ga,
    corrected_age, day_of_life, day_post_admission, interpret_apgar, is_preterm,
    normal_vitals, recommend_for_kramer_grade, recommend_investigations, ApgarInterpretation,
    BirthWeightCategory, BloodGroup, CorrectedAge, DailyGain, GestationalAge, GrowthCategory,
    Investigation, JaundiceAssessment, JaundiceRisk, KramerGrade, KramerRecommendation,
    MaintenanceFluids, MaturityCategory, NormalVitals, RiskFlags, VitalAssessment, WeightChange,
};
use nicu_types::Kilograms;
use nicu_uuid::PatientId;
use serde::Serialize;

/// Jaundice findings entered with a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JaundiceInput {
    pub grade: KramerGrade,
    pub maternal_blood_group: Option<BloodGroup>,
    pub flags: RiskFlags,
}

/// A round as entered at the bedside, before derived fields are computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundInput {
    pub vitals: Vitals,
    pub weight_kg: Option<Kilograms>,
    pub skin_color: SkinColor,
    pub skin_description: Option<String>,
    /// Used only when `skin_color` is `Jaundiced`.
    pub jaundice: Option<JaundiceInput>,
    pub activity: Activity,
    pub feeding: Feeding,
    pub notes: String,
    pub plan: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApgarReading {
    pub minute: u8,
    pub score: u8,
    pub interpretation: ApgarInterpretation,
}

/// Derived figures for one patient at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub patient_id: PatientId,
    pub day_of_life: i64,
    pub day_post_admission: i64,
    pub gestational_age: Option<GestationalAge>,
    /// Present for preterm babies only.
    pub corrected_age: Option<CorrectedAge>,
    pub maturity: Option<MaturityCategory>,
    pub birth_weight_category: BirthWeightCategory,
    pub weight_for_ga: Option<GrowthCategory>,
    /// Present once a weight has been measured after birth.
    pub weight_change: Option<WeightChange>,
    pub daily_gain: Option<DailyGain>,
    pub fluids: MaintenanceFluids,
    pub normal_vitals: NormalVitals,
    /// Vital statuses from the most recent round.
    pub latest_vitals: Option<VitalAssessment>,
    pub apgar: Vec<ApgarReading>,
    pub latest_jaundice: Option<JaundiceAssessment>,
}

/// Jaundice advice computed for a patient without recording anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JaundiceGuidance {
    pub day_of_life: i64,
    pub risk: JaundiceRisk,
    pub recommendation: KramerRecommendation,
    pub investigations: Vec<Investigation>,
}

#[derive(Clone, Debug)]
pub struct RoundService {
    store: RecordStore,
}

impl RoundService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Records a round for a patient.
    ///
    /// When the skin is jaundiced and a Kramer grade was supplied, the stored round carries a
    /// [`JaundiceAssessment`] computed from the patient's gestational age and day of life at
    /// `now`. Returns `Ok(None)` when the patient does not exist.
    ///
    /// # Errors
    ///
    /// Propagates store errors, including [`crate::StoreError::PatientArchived`].
    pub fn record_round(
        &self,
        id: &PatientId,
        input: RoundInput,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Round>> {
        let findings = match (input.skin_color, input.jaundice) {
            (SkinColor::Jaundiced, findings) => findings,
            (_, Some(_)) => {
                tracing::debug!(patient_id = %id, "jaundice findings ignored for non-jaundiced skin");
                None
            }
            _ => None,
        };

        let skin_description = input
            .skin_description
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // The assessment depends on GA and date of birth, so it is built under the store lock.
        self.store.append_round_with(id, |patient| NewRound {
            vitals: input.vitals,
            weight_kg: input.weight_kg,
            clinical: ClinicalExam {
                skin_color: input.skin_color,
                skin_description,
                jaundice: findings.map(|j| {
                    JaundiceAssessment::assess(
                        j.grade,
                        patient.ga_weeks(),
                        day_of_life(patient.date_of_birth, now),
                        j.maternal_blood_group,
                        j.flags,
                        now,
                    )
                }),
                activity: input.activity,
                feeding: input.feeding,
                notes: input.notes,
            },
            plan: input.plan,
        })
    }

    pub fn patient_summary(
        &self,
        id: &PatientId,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<PatientSummary>> {
        Ok(self
            .store
            .get_patient(id)?
            .map(|patient| summarise(&patient, now)))
    }

    /// Risk, Kramer recommendation and investigations for `grade`, not persisted.
    pub fn jaundice_guidance(
        &self,
        id: &PatientId,
        grade: KramerGrade,
        maternal_blood_group: Option<BloodGroup>,
        flags: RiskFlags,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<JaundiceGuidance>> {
        let Some(patient) = self.store.get_patient(id)? else {
            return Ok(None);
        };

        let dol = day_of_life(patient.date_of_birth, now);
        let risk = assess_jaundice_risk(patient.ga_weeks(), dol);
        let recommendation = recommend_for_kramer_grade(grade, dol, is_preterm(patient.ga_weeks()));
        let investigations = recommend_investigations(
            grade,
            maternal_blood_group.as_ref(),
            risk.is_high_risk,
            flags,
        );

        Ok(Some(JaundiceGuidance {
            day_of_life: dol,
            risk,
            recommendation,
            investigations,
        }))
    }
}

/// Computes the bedside figures for `patient` at `now`.
pub fn summarise(patient: &Patient, now: DateTime<Utc>) -> PatientSummary {
    let dol = day_of_life(patient.date_of_birth, now);
    let ga_weeks = patient.ga_weeks();
    let birth_kg = patient.birth_weight_kg.get();

    let weight_change = patient
        .current_weight_kg
        .and_then(|current| calculate_weight_change(current.get(), birth_kg));
    let daily_gain = weight_change
        .and_then(|change| calculate_average_daily_gain(change.grams(), dol));

    let normal = normal_vitals(dol);
    let latest = patient.latest_round();

    PatientSummary {
        patient_id: patient.id,
        day_of_life: dol,
        day_post_admission: day_post_admission(patient.admission_date, now),
        gestational_age: patient.gestational_age(),
        corrected_age: ga_weeks
            .filter(|w| is_preterm(Some(*w)))
            .map(|w| corrected_age(patient.date_of_birth, w, now)),
        maturity: classify_maturity(ga_weeks),
        birth_weight_category: classify_birth_weight(birth_kg),
        weight_for_ga: classify_weight_for_ga(birth_kg, ga_weeks, Some(patient.sex)),
        weight_change,
        daily_gain,
        fluids: calculate_maintenance_fluids(patient.latest_weight().get(), dol),
        normal_vitals: normal,
        latest_vitals: latest.map(|r| normal.assess(&r.vitals.readings())),
        apgar: patient
            .apgar_scores
            .recorded()
            .into_iter()
            .map(|(minute, score)| ApgarReading {
                minute,
                score,
                interpretation: interpret_apgar(score),
            })
            .collect(),
        latest_jaundice: patient
            .rounds
            .iter()
            .rev()
            .find_map(|r| r.clinical.jaundice.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::patient::{ApgarScores, ArchiveStatus, NewPatient, PatientUpsert};
    use crate::StoreError;
    use chrono::{NaiveDate, TimeZone};
    use nicu_rules::{GainStatus, InvestigationCategory, RiskReason, Sex, VitalStatus};
    use nicu_types::NonEmptyText;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_service(temp_dir: &TempDir) -> RoundService {
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf()).unwrap();
        RoundService::new(RecordStore::new(Arc::new(cfg)))
    }

    fn dob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    /// Noon on `day_of_life` (1-based) for a baby born on `dob()`.
    fn noon_on_day(day_of_life: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::days(day_of_life - 1)
    }

    fn admit(service: &RoundService, ga_weeks: u8, birth_kg: f64) -> Patient {
        service
            .store()
            .upsert_patient(PatientUpsert::New(NewPatient {
                name: NonEmptyText::new("Baby Neema").unwrap(),
                sex: Sex::Female,
                date_of_birth: dob(),
                admission_date: dob(),
                admission_source: None,
                birth_weight_kg: Kilograms::new(birth_kg).unwrap(),
                gestational_age: Some(GestationalAge::new(ga_weeks, 0)),
                apgar_scores: ApgarScores {
                    one_min: Some(3),
                    five_min: Some(6),
                    ten_min: Some(8),
                },
            }))
            .unwrap()
    }

    fn jaundiced_round(grade: u8) -> RoundInput {
        RoundInput {
            skin_color: SkinColor::Jaundiced,
            jaundice: Some(JaundiceInput {
                grade: KramerGrade::try_from(grade).unwrap(),
                maternal_blood_group: Some("O+".parse().unwrap()),
                flags: RiskFlags::default(),
            }),
            ..RoundInput::default()
        }
    }

    #[test]
    fn jaundiced_round_stores_assessment() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        let patient = admit(&service, 34, 2.1);

        let round = service
            .record_round(&patient.id, jaundiced_round(3), noon_on_day(2))
            .unwrap()
            .unwrap();
        let assessment = round.clinical.jaundice.unwrap();
        assert_eq!(assessment.kramer_grade, KramerGrade::BelowUmbilicusToKnees);
        assert!(assessment.is_high_risk);
        assert_eq!(assessment.risk_reasons, vec![RiskReason::Preterm]);
        assert_eq!(
            assessment
                .investigations
                .iter()
                .filter(|i| i.category == InvestigationCategory::Baseline)
                .count(),
            5
        );
    }

    #[test]
    fn jaundice_findings_dropped_when_skin_not_jaundiced() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        let patient = admit(&service, 39, 3.2);

        let mut input = jaundiced_round(4);
        input.skin_color = SkinColor::Other;
        input.skin_description = Some("  mottled ".into());
        let round = service
            .record_round(&patient.id, input, noon_on_day(3))
            .unwrap()
            .unwrap();
        assert!(round.clinical.jaundice.is_none());
        assert_eq!(round.clinical.skin_description.as_deref(), Some("mottled"));
    }

    #[test]
    fn record_round_for_unknown_or_archived_patient() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        assert!(service
            .record_round(&PatientId::new(), RoundInput::default(), noon_on_day(1))
            .unwrap()
            .is_none());

        let patient = admit(&service, 39, 3.2);
        service
            .store()
            .archive_patient(&patient.id, ArchiveStatus::Deceased, "")
            .unwrap();
        assert!(matches!(
            service.record_round(&patient.id, RoundInput::default(), noon_on_day(2)),
            Err(StoreError::PatientArchived(_))
        ));
    }

    #[test]
    fn summary_for_preterm_baby() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        let patient = admit(&service, 32, 1.8);

        let input = RoundInput {
            vitals: Vitals {
                heart_rate: Some(175),
                resp_rate: Some(50),
                temperature_c: Some(36.2),
                spo2: None,
                ..Vitals::default()
            },
            weight_kg: Some(Kilograms::new(1.9).unwrap()),
            ..RoundInput::default()
        };
        service
            .record_round(&patient.id, input, noon_on_day(5))
            .unwrap();

        let summary = service
            .patient_summary(&patient.id, noon_on_day(5))
            .unwrap()
            .unwrap();
        assert_eq!(summary.day_of_life, 5);
        assert_eq!(summary.day_post_admission, 5);
        assert_eq!(summary.maturity, Some(MaturityCategory::LatePreterm));
        assert_eq!(summary.birth_weight_category, BirthWeightCategory::Lbw);
        assert_eq!(summary.weight_for_ga, Some(GrowthCategory::Aga));
        assert_eq!(summary.corrected_age.unwrap().correction_days, 56);

        let change = summary.weight_change.unwrap();
        assert_eq!(change.absolute_kg, 0.1);
        assert_eq!(summary.daily_gain.unwrap().grams_per_day, 20.0);
        assert_eq!(summary.daily_gain.unwrap().status, GainStatus::Good);

        assert_eq!(summary.fluids.ml_per_kg_per_day, 120);
        assert_eq!(summary.fluids.daily_total_ml, 228.0);

        let vitals = summary.latest_vitals.unwrap();
        assert_eq!(vitals.heart_rate, Some(VitalStatus::High));
        assert_eq!(vitals.resp_rate, Some(VitalStatus::Normal));
        assert_eq!(vitals.temperature, Some(VitalStatus::Low));
        assert_eq!(vitals.spo2, None);

        let bands: Vec<_> = summary.apgar.iter().map(|a| a.interpretation).collect();
        assert_eq!(
            bands,
            vec![
                ApgarInterpretation::SevereDistress,
                ApgarInterpretation::ModerateDistress,
                ApgarInterpretation::Normal,
            ]
        );
        assert!(summary.latest_jaundice.is_none());
    }

    #[test]
    fn summary_without_rounds() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        let patient = admit(&service, 39, 3.2);

        let summary = service
            .patient_summary(&patient.id, noon_on_day(1))
            .unwrap()
            .unwrap();
        assert!(summary.weight_change.is_none());
        assert!(summary.daily_gain.is_none());
        assert!(summary.latest_vitals.is_none());
        assert!(summary.corrected_age.is_none());
        assert_eq!(summary.fluids.daily_total_ml, 192.0);
        assert!(service
            .patient_summary(&PatientId::new(), noon_on_day(1))
            .unwrap()
            .is_none());
    }

    #[test]
    fn guidance_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let service = test_service(&temp_dir);
        let patient = admit(&service, 39, 3.2);

        let guidance = service
            .jaundice_guidance(
                &patient.id,
                KramerGrade::ToUmbilicus,
                None,
                RiskFlags::default(),
                noon_on_day(2),
            )
            .unwrap()
            .unwrap();
        assert_eq!(guidance.day_of_life, 2);
        assert!(!guidance.risk.is_high_risk);
        assert!(guidance.recommendation.action.starts_with("START PHOTOTHERAPY"));
        assert!(guidance.investigations.is_empty());

        let stored = service.store().get_patient(&patient.id).unwrap().unwrap();
        assert!(stored.rounds.is_empty());
    }
}
