//! Patient record store.
//!
//! All state lives in three JSON files under the configured data directory: the patient
//! collection (rounds embedded in each patient), settings, and the language preference. A
//! missing file reads as its default.
//!
//! Every mutation holds the store's write lock across the whole read-modify-write and replaces
//! the target file atomically: the new contents go to a temporary file in the same directory,
//! which is then renamed over the original. A failed write leaves the previous file intact.
//!
//! Operations that replace more than one file (import, language) write and sync every
//! temporary file before renaming any of them. If a later rename fails, the files already
//! renamed are restored to their previous contents.

use crate::config::CoreConfig;
use crate::constants::DEFAULT_ARCHIVE_REASON;
use crate::patient::{ArchiveStatus, Patient, PatientFilter, PatientStatus, PatientUpsert};
use crate::round::{NewRound, Round};
use crate::settings::{ExportBundle, Language, PartialBundle, Settings};
use crate::{StoreError, StoreResult};
use chrono::Utc;
use nicu_uuid::{next_round_timestamp, PatientId};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;

/// What an import replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of patients written, or `None` when the payload had no patient section.
    pub patients: Option<usize>,
    pub settings: bool,
}

/// New contents for one store file, written and synced beside it but not yet in place.
struct StagedFile {
    target: PathBuf,
    file: NamedTempFile,
    bytes: usize,
}

/// File-backed store for patients, rounds and settings.
///
/// Clones share the same write lock.
#[derive(Clone, Debug)]
pub struct RecordStore {
    cfg: Arc<CoreConfig>,
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn read_json<T>(&self, path: &Path) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "store file missing, using default");
                return Ok(T::default());
            }
            Err(e) => return Err(StoreError::FileRead(e)),
        };
        serde_json::from_str(&contents).map_err(StoreError::Deserialization)
    }

    fn stage_bytes(&self, path: &Path, bytes: &[u8]) -> StoreResult<StagedFile> {
        let dir = self.cfg.data_dir();
        fs::create_dir_all(dir).map_err(StoreError::DataDirCreation)?;

        let mut file = NamedTempFile::new_in(dir).map_err(StoreError::FileWrite)?;
        file.write_all(bytes).map_err(StoreError::FileWrite)?;
        file.as_file().sync_all().map_err(StoreError::FileWrite)?;
        Ok(StagedFile {
            target: path.to_path_buf(),
            file,
            bytes: bytes.len(),
        })
    }

    fn stage_json<T>(&self, path: &Path, value: &T) -> StoreResult<StagedFile>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_vec_pretty(value).map_err(StoreError::Serialization)?;
        self.stage_bytes(path, &json)
    }

    /// Renames staged files into place, in order.
    ///
    /// Before anything is renamed, the current contents of every target except the last are
    /// read. If a rename fails, the targets already replaced are put back (or removed if they
    /// did not exist) and the rename error is returned.
    fn commit(&self, staged: Vec<StagedFile>) -> StoreResult<()> {
        let restorable = staged.len().saturating_sub(1);
        let mut previous = Vec::with_capacity(restorable);
        for entry in &staged[..restorable] {
            match fs::read(&entry.target) {
                Ok(bytes) => previous.push(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => previous.push(None),
                Err(e) => return Err(StoreError::FileRead(e)),
            }
        }

        let mut committed: Vec<PathBuf> = Vec::new();
        for entry in staged {
            if let Err(err) = entry.file.persist(&entry.target) {
                tracing::warn!(
                    path = %entry.target.display(),
                    error = %err.error,
                    "store file rename failed, restoring earlier files"
                );
                self.restore(&committed, &previous);
                return Err(err.into());
            }
            tracing::debug!(path = %entry.target.display(), bytes = entry.bytes, "store file written");
            committed.push(entry.target);
        }
        Ok(())
    }

    fn restore(&self, committed: &[PathBuf], previous: &[Option<Vec<u8>>]) {
        for (path, contents) in committed.iter().zip(previous) {
            let result = match contents {
                Some(bytes) => self
                    .stage_bytes(path, bytes)
                    .and_then(|staged| staged.file.persist(path).map(|_| ()).map_err(Into::into)),
                None => fs::remove_file(path).map_err(StoreError::FileWrite),
            };
            if let Err(e) = result {
                tracing::error!(path = %path.display(), error = %e, "failed to restore store file");
            }
        }
    }

    fn write_json<T>(&self, path: &Path, value: &T) -> StoreResult<()>
    where
        T: Serialize + ?Sized,
    {
        let staged = self.stage_json(path, value)?;
        self.commit(vec![staged])
    }

    fn load_patients(&self) -> StoreResult<Vec<Patient>> {
        self.read_json(&self.cfg.patients_path())
    }

    fn save_patients(&self, patients: &[Patient]) -> StoreResult<()> {
        self.write_json(&self.cfg.patients_path(), patients)
    }

    /// Lists patients matching `filter`, in admission order.
    pub fn list_patients(&self, filter: PatientFilter) -> StoreResult<Vec<Patient>> {
        let mut patients = self.load_patients()?;
        patients.retain(|p| filter.matches(p.status));
        Ok(patients)
    }

    pub fn get_patient(&self, id: &PatientId) -> StoreResult<Option<Patient>> {
        Ok(self.load_patients()?.into_iter().find(|p| p.id == *id))
    }

    /// Creates a patient or edits an existing patient's demographics.
    ///
    /// # Arguments
    ///
    /// * `upsert` - [`PatientUpsert::New`] to admit a patient, or [`PatientUpsert::Existing`]
    ///   carrying an edited copy of a stored record.
    ///
    /// # Returns
    ///
    /// The record as stored after the operation.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if:
    /// - an `Existing` record's id is not in the store,
    /// - the patient file cannot be read, parsed or replaced.
    pub fn upsert_patient(&self, upsert: PatientUpsert) -> StoreResult<Patient> {
        let _guard = self.lock()?;
        let mut patients = self.load_patients()?;

        let stored = match upsert {
            PatientUpsert::New(new_patient) => {
                let patient = new_patient.into_patient(PatientId::new(), Utc::now());
                tracing::info!(patient_id = %patient.id, "patient admitted");
                patients.push(patient.clone());
                patient
            }
            PatientUpsert::Existing(edited) => {
                let id = edited.id;
                let existing = patients
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(StoreError::PatientNotFound(id))?;
                existing.apply_demographics(edited);
                tracing::info!(patient_id = %id, "patient demographics updated");
                existing.clone()
            }
        };

        self.save_patients(&patients)?;
        Ok(stored)
    }

    /// Moves an active patient into an archived state.
    ///
    /// A blank `reason` is recorded as "Not specified". Returns `Ok(None)` when the id is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyArchived`] if the patient is no longer active.
    pub fn archive_patient(
        &self,
        id: &PatientId,
        status: ArchiveStatus,
        reason: &str,
    ) -> StoreResult<Option<Patient>> {
        let _guard = self.lock()?;
        let mut patients = self.load_patients()?;

        let Some(patient) = patients.iter_mut().find(|p| p.id == *id) else {
            return Ok(None);
        };
        if !patient.is_active() {
            tracing::warn!(patient_id = %id, status = %patient.status, "archive refused");
            return Err(StoreError::AlreadyArchived(*id));
        }

        let reason = reason.trim();
        patient.status = PatientStatus::from(status);
        patient.archive_reason = Some(if reason.is_empty() {
            DEFAULT_ARCHIVE_REASON.to_string()
        } else {
            reason.to_string()
        });
        patient.archived_at = Some(Utc::now());
        let archived = patient.clone();

        self.save_patients(&patients)?;
        tracing::info!(patient_id = %id, status = %archived.status, "patient archived");
        Ok(Some(archived))
    }

    /// Appends a round, stamping it later than any existing round for the patient.
    ///
    /// A round carrying a weight also becomes the patient's current weight. Returns `Ok(None)`
    /// when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PatientArchived`] if the patient is no longer active.
    pub fn append_round(&self, id: &PatientId, round: NewRound) -> StoreResult<Option<Round>> {
        self.append_round_with(id, |_| round)
    }

    /// Like [`RecordStore::append_round`], building the round from the stored patient.
    ///
    /// `build` runs under the write lock against the record being appended to, so anything it
    /// derives from the patient (gestational age, date of birth) cannot be stale. It is not
    /// called when the patient is unknown or archived.
    pub fn append_round_with<F>(&self, id: &PatientId, build: F) -> StoreResult<Option<Round>>
    where
        F: FnOnce(&Patient) -> NewRound,
    {
        let _guard = self.lock()?;
        let mut patients = self.load_patients()?;

        let Some(patient) = patients.iter_mut().find(|p| p.id == *id) else {
            return Ok(None);
        };
        if !patient.is_active() {
            tracing::warn!(patient_id = %id, "round refused for archived patient");
            return Err(StoreError::PatientArchived(*id));
        }

        let round = build(patient);
        let previous = patient.latest_round().map(|r| r.timestamp);
        let round = round.stamp(next_round_timestamp(previous, Utc::now()));
        if let Some(weight) = round.weight_kg {
            patient.current_weight_kg = Some(weight);
        }
        patient.rounds.push(round.clone());

        self.save_patients(&patients)?;
        tracing::info!(patient_id = %id, timestamp = %round.timestamp, "round recorded");
        Ok(Some(round))
    }

    pub fn latest_round(&self, id: &PatientId) -> StoreResult<Option<Round>> {
        Ok(self
            .get_patient(id)?
            .and_then(|p| p.rounds.last().cloned()))
    }

    /// Removes a patient and all of their rounds. Returns `false` if the id was unknown.
    pub fn delete_patient(&self, id: &PatientId) -> StoreResult<bool> {
        let _guard = self.lock()?;
        let mut patients = self.load_patients()?;
        let before = patients.len();
        patients.retain(|p| p.id != *id);
        if patients.len() == before {
            return Ok(false);
        }
        self.save_patients(&patients)?;
        tracing::info!(patient_id = %id, "patient deleted");
        Ok(true)
    }

    /// Deletes every store file. The data directory itself is kept.
    pub fn clear_all(&self) -> StoreResult<()> {
        let _guard = self.lock()?;
        for path in [
            self.cfg.patients_path(),
            self.cfg.settings_path(),
            self.cfg.language_path(),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::FileWrite(e)),
            }
        }
        tracing::info!("all store data cleared");
        Ok(())
    }

    pub fn settings(&self) -> StoreResult<Settings> {
        self.read_json(&self.cfg.settings_path())
    }

    pub fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        let _guard = self.lock()?;
        self.write_json(&self.cfg.settings_path(), settings)
    }

    /// Applies `update` to the stored settings and saves the result.
    pub fn update_settings<F>(&self, update: F) -> StoreResult<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let _guard = self.lock()?;
        let mut settings = self.settings()?;
        update(&mut settings);
        self.write_json(&self.cfg.settings_path(), &settings)?;
        Ok(settings)
    }

    pub fn language(&self) -> StoreResult<Language> {
        self.read_json(&self.cfg.language_path())
    }

    /// Stores the language preference and mirrors it into settings.
    pub fn set_language(&self, language: Language) -> StoreResult<()> {
        let _guard = self.lock()?;
        let mut staged = vec![self.stage_json(&self.cfg.language_path(), &language)?];
        let mut settings = self.settings()?;
        if settings.language != language {
            settings.language = language;
            staged.push(self.stage_json(&self.cfg.settings_path(), &settings)?);
        }
        self.commit(staged)?;
        tracing::info!(language = %language, "language changed");
        Ok(())
    }

    /// Snapshot of all patients and settings, taken under the write lock.
    pub fn export(&self) -> StoreResult<ExportBundle> {
        let _guard = self.lock()?;
        Ok(ExportBundle {
            patients: self.load_patients()?,
            settings: self.settings()?,
            export_date: Utc::now(),
        })
    }

    /// Replaces all patients and settings with the bundle's contents.
    pub fn import(&self, bundle: &ExportBundle) -> StoreResult<()> {
        let _guard = self.lock()?;
        let staged = vec![
            self.stage_json(&self.cfg.patients_path(), &bundle.patients)?,
            self.stage_json(&self.cfg.settings_path(), &bundle.settings)?,
        ];
        self.commit(staged)?;
        tracing::info!(patients = bundle.patients.len(), "bundle imported");
        Ok(())
    }

    /// Imports a JSON bundle in which either section may be absent.
    ///
    /// Sections present in the payload replace the stored data wholesale; absent sections are
    /// left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Import`] with the path to the offending field when the payload
    /// does not match the bundle schema.
    pub fn import_json(&self, json: &str) -> StoreResult<ImportSummary> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let bundle = match serde_path_to_error::deserialize::<_, PartialBundle>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(StoreError::Import { path, source });
            }
        };

        let _guard = self.lock()?;
        let mut summary = ImportSummary::default();
        let mut staged = Vec::with_capacity(2);
        if let Some(patients) = &bundle.patients {
            staged.push(self.stage_json(&self.cfg.patients_path(), patients)?);
            summary.patients = Some(patients.len());
        }
        if let Some(settings) = &bundle.settings {
            staged.push(self.stage_json(&self.cfg.settings_path(), settings)?);
            summary.settings = true;
        }
        self.commit(staged)?;
        tracing::info!(
            patients = ?summary.patients,
            settings = summary.settings,
            "import complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{ApgarScores, NewPatient};
    use crate::round::{ClinicalExam, Vitals};
    use crate::settings::Theme;
    use chrono::NaiveDate;
    use nicu_rules::{GestationalAge, RiskReason, Sex};
    use nicu_types::{Kilograms, NonEmptyText};
    use tempfile::TempDir;

    fn test_store(temp_dir: &TempDir) -> RecordStore {
        let cfg = CoreConfig::new(temp_dir.path().join("data")).unwrap();
        RecordStore::new(Arc::new(cfg))
    }

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: NonEmptyText::new(name).unwrap(),
            sex: Sex::Male,
            date_of_birth: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            admission_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            admission_source: Some("Labour ward".into()),
            birth_weight_kg: Kilograms::new(2.5).unwrap(),
            gestational_age: Some(GestationalAge::new(38, 2)),
            apgar_scores: ApgarScores::default(),
        }
    }

    fn admit(store: &RecordStore, name: &str) -> Patient {
        store
            .upsert_patient(PatientUpsert::New(new_patient(name)))
            .unwrap()
    }

    fn round_with_weight(kg: Option<f64>) -> NewRound {
        NewRound {
            vitals: Vitals {
                heart_rate: Some(140),
                ..Vitals::default()
            },
            weight_kg: kg.map(|w| Kilograms::new(w).unwrap()),
            clinical: ClinicalExam::default(),
            plan: "Continue feeds".into(),
        }
    }

    #[test]
    fn empty_store_reads_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(store.list_patients(PatientFilter::All).unwrap().is_empty());
        assert_eq!(store.settings().unwrap(), Settings::default());
        assert_eq!(store.language().unwrap(), Language::En);
    }

    #[test]
    fn upsert_new_assigns_identity() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let patient = admit(&store, "Baby Juma");
        assert_eq!(patient.status, PatientStatus::Active);
        assert_eq!(store.get_patient(&patient.id).unwrap(), Some(patient.clone()));
        assert!(store.config().patients_path().is_file());
    }

    #[test]
    fn upsert_existing_preserves_identity_and_rounds() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby Juma");
        store
            .append_round(&patient.id, round_with_weight(Some(2.4)))
            .unwrap();

        let mut edited = patient.clone();
        edited.name = NonEmptyText::new("Baby Juma Mwita").unwrap();
        edited.rounds.clear();
        edited.current_weight_kg = None;
        edited.created_at = Utc::now() + chrono::Duration::days(3);

        let stored = store
            .upsert_patient(PatientUpsert::Existing(edited))
            .unwrap();
        assert_eq!(stored.name.as_str(), "Baby Juma Mwita");
        assert_eq!(stored.id, patient.id);
        assert_eq!(stored.created_at, patient.created_at);
        assert_eq!(stored.rounds.len(), 1);
        assert_eq!(stored.current_weight_kg.map(|w| w.get()), Some(2.4));
    }

    #[test]
    fn upsert_unknown_patient_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let mut stranger = admit(&store, "Baby Juma");
        stranger.id = PatientId::new();
        assert!(matches!(
            store.upsert_patient(PatientUpsert::Existing(stranger)),
            Err(StoreError::PatientNotFound(_))
        ));
    }

    #[test]
    fn archived_patients_leave_active_listing() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let kept = admit(&store, "Baby A");
        let gone = admit(&store, "Baby B");

        let archived = store
            .archive_patient(&gone.id, ArchiveStatus::Discharged, "  ")
            .unwrap()
            .unwrap();
        assert_eq!(archived.status, PatientStatus::Discharged);
        assert_eq!(archived.archive_reason.as_deref(), Some(DEFAULT_ARCHIVE_REASON));
        assert!(archived.archived_at.is_some());

        let active = store.list_patients(PatientFilter::Active).unwrap();
        assert_eq!(active.iter().map(|p| p.id).collect::<Vec<_>>(), vec![kept.id]);
        let archived_list = store.list_patients(PatientFilter::Archived).unwrap();
        assert_eq!(archived_list.len(), 1);
        assert_eq!(store.list_patients(PatientFilter::All).unwrap().len(), 2);
    }

    #[test]
    fn archiving_twice_fails_and_keeps_first_archive() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");
        let first = store
            .archive_patient(&patient.id, ArchiveStatus::Transferred, "Referral hospital")
            .unwrap()
            .unwrap();

        assert!(matches!(
            store.archive_patient(&patient.id, ArchiveStatus::Deceased, "again"),
            Err(StoreError::AlreadyArchived(_))
        ));
        let stored = store.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(stored.status, PatientStatus::Transferred);
        assert_eq!(stored.archived_at, first.archived_at);
    }

    #[test]
    fn archive_unknown_patient_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        assert!(store
            .archive_patient(&PatientId::new(), ArchiveStatus::Discharged, "")
            .unwrap()
            .is_none());
    }

    #[test]
    fn rounds_are_ordered_and_update_weight() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");

        let first = store
            .append_round(&patient.id, round_with_weight(Some(2.45)))
            .unwrap()
            .unwrap();
        let second = store
            .append_round(&patient.id, round_with_weight(None))
            .unwrap()
            .unwrap();
        assert!(second.timestamp > first.timestamp);

        let stored = store.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(stored.rounds.len(), 2);
        assert_eq!(stored.current_weight_kg.map(|w| w.get()), Some(2.45));
        assert_eq!(store.latest_round(&patient.id).unwrap(), Some(second));
    }

    #[test]
    fn rounds_refused_after_archive() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");
        store
            .archive_patient(&patient.id, ArchiveStatus::Discharged, "Home")
            .unwrap();
        assert!(matches!(
            store.append_round(&patient.id, round_with_weight(None)),
            Err(StoreError::PatientArchived(_))
        ));
        assert!(store
            .append_round(&PatientId::new(), round_with_weight(None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn delete_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");
        store.set_language(Language::Sw).unwrap();

        assert!(store.delete_patient(&patient.id).unwrap());
        assert!(!store.delete_patient(&patient.id).unwrap());

        admit(&store, "Baby B");
        store.clear_all().unwrap();
        assert!(store.list_patients(PatientFilter::All).unwrap().is_empty());
        assert_eq!(store.language().unwrap(), Language::En);
        assert!(store.config().data_dir().is_dir());
    }

    #[test]
    fn settings_update_and_language_mirror() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let updated = store.update_settings(|s| s.theme = Theme::Dark).unwrap();
        assert_eq!(updated.theme, Theme::Dark);

        store.set_language(Language::Sw).unwrap();
        assert_eq!(store.language().unwrap(), Language::Sw);
        let settings = store.settings().unwrap();
        assert_eq!(settings.language, Language::Sw);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn export_then_import_reproduces_data() {
        let source_dir = TempDir::new().unwrap();
        let source = test_store(&source_dir);
        let patient = admit(&source, "Baby A");
        source
            .append_round(&patient.id, round_with_weight(Some(2.6)))
            .unwrap();
        admit(&source, "Baby B");
        source.update_settings(|s| s.theme = Theme::Dark).unwrap();
        let bundle = source.export().unwrap();

        let target_dir = TempDir::new().unwrap();
        let target = test_store(&target_dir);
        admit(&target, "Someone else");
        target.import(&bundle).unwrap();

        assert_eq!(
            target.list_patients(PatientFilter::All).unwrap(),
            bundle.patients
        );
        assert_eq!(target.settings().unwrap(), bundle.settings);
    }

    #[test]
    fn import_json_leaves_missing_sections() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");

        let summary = store
            .import_json(r#"{"settings": {"theme": "dark", "language": "sw"}}"#)
            .unwrap();
        assert_eq!(summary.patients, None);
        assert!(summary.settings);
        assert_eq!(
            store.list_patients(PatientFilter::All).unwrap(),
            vec![patient]
        );
        assert_eq!(store.settings().unwrap().theme, Theme::Dark);
    }

    #[test]
    fn import_json_reports_failing_path() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let err = store
            .import_json(r#"{"settings": {"theme": "purple"}}"#)
            .unwrap_err();
        match err {
            StoreError::Import { path, .. } => assert_eq!(path, "settings.theme"),
            other => panic!("unexpected error: {other}"),
        }

        let err = store.import_json("[1, 2]").unwrap_err();
        assert!(matches!(err, StoreError::Import { .. }));
    }

    const BROWSER_EXPORT: &str = r#"{
        "patients": [
            {
                "name": "Baby of Amina",
                "sex": "F",
                "dateOfBirth": "2026-03-01",
                "birthWeight": 1.85,
                "admissionDate": "2026-03-01",
                "admissionSource": "Not specified",
                "status": "active",
                "apgarScores": {"oneMin": 6, "fiveMin": 8, "tenMin": null},
                "gaWeeks": 34,
                "gaDays": 0,
                "rounds": [
                    {
                        "type": "daily",
                        "vitals": {
                            "heartRate": 148,
                            "respRate": 52,
                            "temperature": 36.9,
                            "spo2": 97,
                            "oxygenSupport": "RA"
                        },
                        "weight": 1.8,
                        "clinical": {
                            "skinColor": "jaundiced",
                            "jaundice": {
                                "kramerScore": 2,
                                "isHighRisk": true,
                                "riskReasons": ["Preterm baby (GA <37 weeks)"],
                                "assessmentDate": "2026-03-03T08:12:45.120Z"
                            },
                            "activity": "active",
                            "feeding": "ebm",
                            "notes": ""
                        },
                        "plan": "Recheck bilirubin",
                        "timestamp": "2026-03-03T08:12:45.121Z"
                    }
                ],
                "id": "patient_1772323200000_k3j9x0abc",
                "createdAt": "2026-03-01T00:00:00.000Z",
                "currentWeight": 1.8
            },
            {
                "name": "Baby Juma",
                "sex": "M",
                "dateOfBirth": "2026-02-20",
                "birthWeight": 3.1,
                "admissionDate": "2026-02-20",
                "admissionSource": "Labour ward",
                "status": "discharged",
                "apgarScores": {"oneMin": null, "fiveMin": null, "tenMin": null},
                "gaWeeks": null,
                "gaDays": 0,
                "rounds": [
                    {
                        "type": "daily",
                        "vitals": {
                            "heartRate": null,
                            "respRate": null,
                            "temperature": null,
                            "spo2": null,
                            "oxygenSupport": "RA"
                        },
                        "weight": null,
                        "clinical": {
                            "skinColor": "normal",
                            "jaundice": null,
                            "activity": "active",
                            "feeding": "breastfeeding",
                            "notes": ""
                        },
                        "plan": "",
                        "timestamp": "2026-02-21T09:00:00.000Z"
                    }
                ],
                "id": "patient_1771545600000_q8w2e",
                "createdAt": "2026-02-20T10:00:00.000Z",
                "archiveReason": "Home",
                "archivedAt": "2026-02-25T12:00:00.000Z"
            }
        ],
        "settings": {"language": "sw", "theme": "light", "defaultView": "patients"},
        "exportDate": "2026-03-04T07:00:00.000Z"
    }"#;

    #[test]
    fn import_json_accepts_browser_export() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let summary = store.import_json(BROWSER_EXPORT).unwrap();
        assert_eq!(summary.patients, Some(2));
        assert!(summary.settings);
        assert_eq!(store.settings().unwrap().language, Language::Sw);

        let amina_id = PatientId::from_legacy("patient_1772323200000_k3j9x0abc").unwrap();
        let amina = store.get_patient(&amina_id).unwrap().unwrap();
        assert_eq!(amina.name.as_str(), "Baby of Amina");
        assert_eq!(amina.ga_weeks(), Some(34));
        assert_eq!(amina.current_weight_kg.map(|w| w.get()), Some(1.8));
        let jaundice = amina.rounds[0].clinical.jaundice.as_ref().unwrap();
        assert_eq!(jaundice.risk_reasons, vec![RiskReason::Preterm]);

        let active = store.list_patients(PatientFilter::Active).unwrap();
        assert_eq!(active.len(), 1);
        let archived = store.list_patients(PatientFilter::Archived).unwrap();
        assert_eq!(archived[0].status, PatientStatus::Discharged);
        assert_eq!(archived[0].rounds[0].vitals.heart_rate, None);

        // Ids are stored canonically and stay stable across a second import.
        let exported = serde_json::to_string(&store.export().unwrap()).unwrap();
        assert!(!exported.contains("patient_"));
        store.import_json(BROWSER_EXPORT).unwrap();
        assert!(store.get_patient(&amina_id).unwrap().is_some());
    }

    #[test]
    fn failed_rename_restores_files_already_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");
        let before = fs::read(store.config().patients_path()).unwrap();

        // A directory in place of the settings file makes its rename fail.
        fs::create_dir_all(store.config().settings_path().join("blocker")).unwrap();
        let bundle = ExportBundle {
            patients: Vec::new(),
            settings: Settings::default(),
            export_date: Utc::now(),
        };
        let err = store.import(&bundle).unwrap_err();
        assert!(matches!(err, StoreError::FilePersist(_)));

        assert_eq!(fs::read(store.config().patients_path()).unwrap(), before);
        assert_eq!(
            store.list_patients(PatientFilter::All).unwrap(),
            vec![patient]
        );
    }

    #[test]
    fn failed_rename_leaves_no_temporary_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        fs::create_dir_all(store.config().settings_path()).unwrap();

        let err = store.save_settings(&Settings::default()).unwrap_err();
        assert!(matches!(err, StoreError::FilePersist(_)));
        drop(err);

        let entries: Vec<_> = fs::read_dir(store.config().data_dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(crate::constants::SETTINGS_FILENAME)]);
    }

    #[test]
    fn append_round_with_sees_the_stored_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let patient = admit(&store, "Baby A");

        let mut edited = patient.clone();
        edited.ga_weeks = Some(30);
        store
            .upsert_patient(PatientUpsert::Existing(edited))
            .unwrap();

        let mut seen = None;
        store
            .append_round_with(&patient.id, |stored| {
                seen = stored.ga_weeks();
                round_with_weight(None)
            })
            .unwrap()
            .unwrap();
        assert_eq!(seen, Some(30));

        store
            .archive_patient(&patient.id, ArchiveStatus::Transferred, "")
            .unwrap();
        let mut called = false;
        let result = store.append_round_with(&patient.id, |_| {
            called = true;
            round_with_weight(None)
        });
        assert!(matches!(result, Err(StoreError::PatientArchived(_))));
        assert!(!called);
    }

    #[test]
    fn export_waits_for_the_write_lock() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        admit(&store, "Baby A");

        let guard = store.write_lock.lock().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let exporter = store.clone();
        let handle = std::thread::spawn(move || {
            let bundle = exporter.export().unwrap();
            tx.send(bundle.patients.len()).unwrap();
        });

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(rx.try_recv().is_err());
        drop(guard);

        assert_eq!(rx.recv().unwrap(), 1);
        handle.join().unwrap();
    }

    #[test]
    fn corrupt_patient_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        fs::create_dir_all(store.config().data_dir()).unwrap();
        fs::write(store.config().patients_path(), "{not json").unwrap();
        assert!(matches!(
            store.list_patients(PatientFilter::All),
            Err(StoreError::Deserialization(_))
        ));
    }

    #[test]
    fn clones_share_the_write_lock() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let other = store.clone();
        assert!(Arc::ptr_eq(&store.write_lock, &other.write_lock));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || admit(&store, &format!("Baby {i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.list_patients(PatientFilter::All).unwrap().len(), 4);
    }
}
