//! # NICU Core
//!
//! Patient record storage and round orchestration for the NICU rounds tool.
//!
//! This crate contains the data model and all file operations:
//! - [`RecordStore`]: patients, rounds and settings as JSON files under the data directory
//! - [`RoundService`]: records rounds and computes bedside summaries using `nicu-rules`
//! - [`CoreConfig`]: the data directory, resolved once at startup
//!
//! Clinical calculations live in `nicu-rules`; command-line concerns live in the `nicu` binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod round;
pub mod rounds;
pub mod settings;
pub mod store;

pub use config::CoreConfig;
pub use error::{StoreError, StoreResult};
pub use patient::{
    ApgarScores, ArchiveStatus, NewPatient, Patient, PatientFilter, PatientStatus, PatientUpsert,
};
pub use round::{Activity, ClinicalExam, Feeding, NewRound, OxygenSupport, Round, SkinColor, Vitals};
pub use rounds::{
    summarise, ApgarReading, JaundiceGuidance, JaundiceInput, PatientSummary, RoundInput,
    RoundService,
};
pub use settings::{DefaultView, ExportBundle, Language, Settings, Theme};
pub use store::{ImportSummary, RecordStore};

pub use nicu_types::{Kilograms, NonEmptyText};
pub use nicu_uuid::PatientId;
