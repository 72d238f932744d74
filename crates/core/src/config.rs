//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! nothing in this crate reads environment variables while handling a request.

use crate::constants::{LANGUAGE_FILENAME, PATIENTS_FILENAME, SETTINGS_FILENAME};
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The directory need not exist yet; the store creates it on first write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidConfig`] if `data_dir` is empty or names an existing path
    /// that is not a directory.
    pub fn new(data_dir: PathBuf) -> StoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(StoreError::InvalidConfig(
                "data directory cannot be empty".into(),
            ));
        }
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(StoreError::InvalidConfig(format!(
                "data directory path is not a directory: {}",
                data_dir.display()
            )));
        }

        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn patients_path(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_FILENAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILENAME)
    }

    pub fn language_path(&self) -> PathBuf {
        self.data_dir.join(LANGUAGE_FILENAME)
    }
}
