//! Core runtime configuration.
//!
//! Resolved once at process startup and passed into the store. Operations never read
//! environment variables themselves.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_SNAPSHOT_FILE};
use crate::{HospitalError, HospitalResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    snapshot_file: String,
}

impl CoreConfig {
    pub fn new(data_dir: PathBuf, snapshot_file: String) -> HospitalResult<Self> {
        let snapshot_file = snapshot_file.trim().to_owned();
        if snapshot_file.is_empty() {
            return Err(HospitalError::InvalidInput(
                "snapshot file name cannot be empty".into(),
            ));
        }
        if snapshot_file.contains(&['/', '\\'][..]) {
            return Err(HospitalError::InvalidInput(
                "snapshot file name must not contain path separators".into(),
            ));
        }

        Ok(Self {
            data_dir,
            snapshot_file,
        })
    }

    /// Builds a config from optional overrides, falling back to the defaults.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        snapshot_file: Option<String>,
    ) -> HospitalResult<Self> {
        Self::new(
            data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            snapshot_file.unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_owned()),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_file(&self) -> &str {
        &self.snapshot_file
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }
}
