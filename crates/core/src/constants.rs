//! Constants used throughout the NICU core crate.
//!
//! File names are shared by the store and the export/import path so that the on-disk layout is
//! defined in one place.

/// Default directory for record storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "nicu_data";

/// Filename for the patient collection, rounds included.
pub const PATIENTS_FILENAME: &str = "nicu_patients.json";

/// Filename for user settings.
pub const SETTINGS_FILENAME: &str = "nicu_settings.json";

/// Filename for the standalone language preference.
pub const LANGUAGE_FILENAME: &str = "nicu_language.json";

/// Admission source recorded when none is given.
pub const DEFAULT_ADMISSION_SOURCE: &str = "Not specified";

/// Archive reason recorded when the reason is blank.
pub const DEFAULT_ARCHIVE_REASON: &str = "Not specified";
