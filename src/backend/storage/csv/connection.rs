use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::storage::traits::Connection;

const EXPENSES_FILE: &str = "expenses.csv";
const CATEGORIES_FILE: &str = "categories.csv";
const SETTINGS_FILE: &str = "settings.yaml";
const RECEIPTS_DIR: &str = "receipts";

pub(super) const EXPENSES_HEADER: &str = "id,date,purpose,location,amount,notes,receipt,categories";
pub(super) const CATEGORIES_HEADER: &str = "id,name";

/// CsvConnection manages file paths and ensures the data files exist
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a new CSV connection in the platform data directory
    pub fn new_default() -> Result<Self> {
        let project_dirs = directories::ProjectDirs::from("", "", "Expense Tracker")
            .ok_or_else(|| anyhow::anyhow!("Could not determine platform data directory"))?;
        Self::new(project_dirs.data_dir())
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn expenses_file_path(&self) -> PathBuf {
        self.base_directory.join(EXPENSES_FILE)
    }

    pub fn categories_file_path(&self) -> PathBuf {
        self.base_directory.join(CATEGORIES_FILE)
    }

    pub fn settings_file_path(&self) -> PathBuf {
        self.base_directory.join(SETTINGS_FILE)
    }

    /// Directory holding one JPEG per stored receipt image
    pub fn receipts_directory(&self) -> PathBuf {
        self.base_directory.join(RECEIPTS_DIR)
    }

    /// Ensure the expenses CSV file exists with its header
    pub fn ensure_expenses_file_exists(&self) -> std::io::Result<()> {
        Self::ensure_csv_file(&self.expenses_file_path(), EXPENSES_HEADER)
    }

    /// Ensure the categories CSV file exists with its header
    pub fn ensure_categories_file_exists(&self) -> std::io::Result<()> {
        Self::ensure_csv_file(&self.categories_file_path(), CATEGORIES_HEADER)
    }

    /// Ensure the receipts directory exists
    pub fn ensure_receipts_directory_exists(&self) -> std::io::Result<()> {
        let dir = self.receipts_directory();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    fn ensure_csv_file(path: &Path, header: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(path, format!("{}\n", header))?;
        }
        Ok(())
    }
}

impl Connection for CsvConnection {
    type ExpenseRepository = super::expense_repository::ExpenseRepository;
    type CategoryRepository = super::category_repository::CategoryRepository;
    type SettingsRepository = super::settings_repository::SettingsRepository;

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        super::expense_repository::ExpenseRepository::new(self.clone())
    }

    fn create_category_repository(&self) -> Self::CategoryRepository {
        super::category_repository::CategoryRepository::new(self.clone())
    }

    fn create_settings_repository(&self) -> Self::SettingsRepository {
        super::settings_repository::SettingsRepository::new(self.clone())
    }
}
