//! # Settings Repository
//!
//! File-based settings storage using a single YAML file `settings.yaml` at
//! the root of the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! pro_unlocked: false
//! app_has_been_reset: false
//! currency_label: "€"
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```
//!
//! Writes are atomic (temp file, then rename). The first read creates the
//! file with defaults.

use chrono::Utc;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::backend::storage::error::StorageError;
use crate::backend::storage::traits::{AppSettings, SettingsStorage};

/// YAML-file settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    /// Create a new settings repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn settings_path(&self) -> PathBuf {
        self.connection.settings_file_path()
    }

    /// Load settings from file, creating defaults if the file is missing
    fn load_or_create(&self) -> Result<AppSettings, StorageError> {
        let path = self.settings_path();

        if path.exists() {
            let yaml = fs::read_to_string(&path).map_err(|e| StorageError::read("settings", e))?;
            let settings: AppSettings =
                serde_yaml::from_str(&yaml).map_err(|e| StorageError::read("settings", e))?;
            debug!("Loaded settings from {}", path.display());
            Ok(settings)
        } else {
            let settings = AppSettings::default();
            self.save(&settings)?;
            info!("Created default settings at {}", path.display());
            Ok(settings)
        }
    }

    fn save(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let path = self.settings_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::write("settings", e))?;
            }
        }

        let yaml =
            serde_yaml::to_string(settings).map_err(|e| StorageError::write("settings", e))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml).map_err(|e| StorageError::write("settings", e))?;
        fs::rename(&temp_path, &path).map_err(|e| StorageError::write("settings", e))?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self) -> Result<AppSettings, StorageError> {
        self.load_or_create()
    }

    fn update_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        let mut updated = settings.clone();
        updated.updated_at = Utc::now().to_rfc3339();
        self.save(&updated)
    }
}
