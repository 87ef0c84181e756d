//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. All
//! operations are synchronous; every failure is a typed [`StorageError`]
//! so callers can tell a failed save from a failed fetch.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::domain::models::category::Category;
use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::error::StorageError;

/// Trait defining the interface for expense storage operations
pub trait ExpenseStorage: Send + Sync {
    /// Store a new expense
    fn store_expense(&self, expense: &Expense) -> Result<(), StorageError>;

    /// Retrieve a specific expense by ID
    fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, StorageError>;

    /// List all expenses ordered by date ascending (oldest first)
    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError>;

    /// Overwrite an existing expense
    /// Returns true if the expense was found and updated, false otherwise
    fn update_expense(&self, expense: &Expense) -> Result<bool, StorageError>;

    /// Delete a single expense together with its stored receipt image.
    /// Returns true if the expense was found and deleted, false otherwise
    fn delete_expense(&self, expense_id: Uuid) -> Result<bool, StorageError>;

    /// Delete every expense and receipt image (app reset).
    /// Returns the number of expenses deleted
    fn delete_all_expenses(&self) -> Result<u32, StorageError>;

    /// Store receipt image bytes for an expense, re-encoded as JPEG.
    /// Returns the stored file name to record on the expense
    fn store_receipt_image(&self, expense_id: Uuid, bytes: &[u8]) -> Result<String, StorageError>;

    /// Load the raw bytes of a stored receipt image
    fn load_receipt_image(&self, file_name: &str) -> Result<Vec<u8>, StorageError>;
}

/// Trait defining the interface for category storage operations
pub trait CategoryStorage: Send + Sync {
    /// Store a new category
    fn store_category(&self, category: &Category) -> Result<(), StorageError>;

    /// Look up a category by exact name match (case-sensitive)
    fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, StorageError>;

    /// Look up a category by name ignoring ASCII case
    fn find_category_ignore_case(&self, name: &str) -> Result<Option<Category>, StorageError>;

    /// List all categories ordered by name
    fn list_categories(&self) -> Result<Vec<Category>, StorageError>;
}

/// Persisted application settings.
///
/// The equivalent of the original app's user-defaults blob: the pro flag,
/// the reset marker that suppresses sample-data seeding, and a currency
/// label (label storage only, never converted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Whether the pro version has been purchased or restored
    pub pro_unlocked: bool,
    /// Set by app reset; suppresses sample-data seeding from then on
    pub app_has_been_reset: bool,
    /// Currency label shown next to totals
    pub currency_label: String,
    /// Data format version for future migrations
    pub data_format_version: String,
    /// When the settings file was first created
    pub created_at: String,
    /// When the settings file was last updated
    pub updated_at: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            pro_unlocked: false,
            app_has_been_reset: false,
            currency_label: "€".to_string(),
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Trait defining the interface for settings storage operations
pub trait SettingsStorage: Send + Sync {
    /// Get the settings, creating defaults on first access
    fn get_settings(&self) -> Result<AppSettings, StorageError>;

    /// Persist the settings (bumps `updated_at`)
    fn update_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories, so the domain layer can work
/// with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone {
    type ExpenseRepository: ExpenseStorage + Clone;
    type CategoryRepository: CategoryStorage + Clone;
    type SettingsRepository: SettingsStorage + Clone;

    fn create_expense_repository(&self) -> Self::ExpenseRepository;
    fn create_category_repository(&self) -> Self::CategoryRepository;
    fn create_settings_repository(&self) -> Self::SettingsRepository;
}
