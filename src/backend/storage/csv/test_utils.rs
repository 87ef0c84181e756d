//! Test utilities for storage and service tests.
//!
//! Provides a temp-directory environment that cleans itself up even when a
//! test panics, plus builders for the fixtures most tests need.

use anyhow::Result;
use chrono::NaiveDate;
use std::io::Cursor;
use tempfile::TempDir;
use uuid::Uuid;

use super::category_repository::CategoryRepository;
use super::connection::CsvConnection;
use super::expense_repository::ExpenseRepository;
use super::settings_repository::SettingsRepository;
use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::traits::Connection;

/// Test environment with a temporary data directory that is removed when
/// the environment is dropped.
pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

/// Test helper bundling repository instances over one environment
pub struct TestHelper {
    pub env: TestEnvironment,
    pub expense_repo: ExpenseRepository,
    pub category_repo: CategoryRepository,
    pub settings_repo: SettingsRepository,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let expense_repo = env.connection.create_expense_repository();
        let category_repo = env.connection.create_category_repository();
        let settings_repo = env.connection.create_settings_repository();
        Ok(Self {
            env,
            expense_repo,
            category_repo,
            settings_repo,
        })
    }
}

/// Build an expense with fixed filler fields for the given date and amount
pub fn sample_expense(date: NaiveDate, amount: &str) -> Expense {
    Expense {
        id: Uuid::new_v4(),
        date,
        purpose: "Test purpose".to_string(),
        location: "Test location".to_string(),
        amount: amount.parse().expect("test amount parses"),
        notes: "Test notes".to_string(),
        receipt: None,
        category_ids: Vec::new(),
    }
}

/// A tiny valid PNG, for receipt-image tests
pub fn test_png_bytes() -> Vec<u8> {
    let pixel = image::Rgb([200u8, 120, 40]);
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(4, 4, pixel));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .expect("encode test image");
    buffer
}
