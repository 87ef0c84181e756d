//! # CSV Storage Module
//!
//! File-based storage implementation for the expense tracker. The data
//! directory holds one CSV file per record type, a YAML settings file, and
//! a `receipts/` directory with one JPEG per stored receipt image.
//!
//! ## Layout
//!
//! ```text
//! data/
//! ├── expenses.csv
//! ├── categories.csv
//! ├── settings.yaml
//! └── receipts/
//!     └── {expense_id}.jpg
//! ```
//!
//! ## File Format
//!
//! ```csv
//! id,date,purpose,location,amount,notes,receipt,categories
//! 1d6c…,2024-01-15,Team lunch,Berlin,23.50,with client,1d6c….jpg,9f2a…;77b0…
//! ```
//!
//! The `categories` field is a `;`-joined list of category ids. All writes
//! rewrite the whole file through a temp file and rename, so readers never
//! observe a half-written file.

pub mod category_repository;
pub mod connection;
pub mod expense_repository;
pub mod settings_repository;

#[cfg(test)]
pub mod test_utils;

pub use category_repository::CategoryRepository;
pub use connection::CsvConnection;
pub use expense_repository::ExpenseRepository;
pub use settings_repository::SettingsRepository;
