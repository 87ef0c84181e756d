//! # Backend Module
//!
//! This module wires the domain services over one storage connection and
//! is the single entry point a UI needs. Everything is synchronous: all
//! operations are short local-disk interactions driven by the UI thread.
//! Services receive their collaborators through constructors; there is no
//! process-wide singleton.

use anyhow::Result;
use chrono::{Local, Months};
use log::info;
use rand::Rng;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

use domain::commands::expenses::CreateExpenseCommand;
use domain::{
    AnalysisService, CategoryService, ExpenseService, ProService, ReceiptScanner, SummaryService,
};
use storage::csv::{CsvConnection, SettingsRepository};
use storage::traits::{AppSettings, Connection, SettingsStorage};

/// Months of sample data seeded on first launch
const SAMPLE_MONTHS: u32 = 6;
/// Sample expenses per month
const SAMPLE_EXPENSES_PER_MONTH: u32 = 10;

/// Main backend struct that orchestrates all services
pub struct Backend {
    pub expense_service: ExpenseService<CsvConnection>,
    pub category_service: CategoryService<CsvConnection>,
    pub summary_service: SummaryService<CsvConnection>,
    pub analysis_service: AnalysisService<CsvConnection>,
    pub pro_service: ProService<CsvConnection>,
    pub receipt_scanner: ReceiptScanner,
    settings_repository: SettingsRepository,
}

impl Backend {
    /// Create a backend over the platform data directory
    pub fn new() -> Result<Self> {
        Self::with_connection(Arc::new(CsvConnection::new_default()?))
    }

    /// Create a backend over a specific data directory
    pub fn with_data_directory<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        Self::with_connection(Arc::new(CsvConnection::new(data_directory)?))
    }

    fn with_connection(connection: Arc<CsvConnection>) -> Result<Self> {
        let category_service = CategoryService::new(connection.clone());
        let expense_service = ExpenseService::new(connection.clone(), category_service.clone());
        let summary_service = SummaryService::new(connection.clone());
        let analysis_service = AnalysisService::new(connection.clone());
        let pro_service = ProService::new(connection.clone());
        let settings_repository = connection.create_settings_repository();

        let backend = Self {
            expense_service,
            category_service,
            summary_service,
            analysis_service,
            pro_service,
            receipt_scanner: ReceiptScanner::new(),
            settings_repository,
        };

        backend.pro_service.load_persisted_status()?;
        backend.seed_sample_data_if_needed()?;
        backend.summary_service.refresh()?;

        Ok(backend)
    }

    /// Current application settings (pro flag, currency label, reset marker)
    pub fn settings(&self) -> Result<AppSettings> {
        Ok(self.settings_repository.get_settings()?)
    }

    /// Delete every expense and suppress sample-data seeding from now on.
    /// Categories stay; they are a persistent tag vocabulary.
    ///
    /// Returns the number of expenses deleted
    pub fn reset_app(&self) -> Result<u32> {
        let deleted = self.expense_service.delete_all_expenses()?;

        let mut settings = self.settings_repository.get_settings()?;
        settings.app_has_been_reset = true;
        self.settings_repository.update_settings(&settings)?;

        self.summary_service.refresh()?;
        info!("App reset: {} expenses deleted", deleted);
        Ok(deleted)
    }

    /// Seed a few months of sample expenses on first launch, so the UI has
    /// something to show. Never runs again once the user has reset the app
    /// or once any expense exists.
    fn seed_sample_data_if_needed(&self) -> Result<()> {
        let settings = self.settings_repository.get_settings()?;
        if settings.app_has_been_reset {
            return Ok(());
        }
        if !self.expense_service.list_expenses()?.is_empty() {
            return Ok(());
        }

        let today = Local::now().date_naive();
        let mut rng = rand::thread_rng();

        for month_offset in 0..SAMPLE_MONTHS {
            let date = today
                .checked_sub_months(Months::new(month_offset))
                .unwrap_or(today);
            for _ in 0..SAMPLE_EXPENSES_PER_MONTH {
                let cents = rng.gen_range(1_000..10_000);
                self.expense_service.create_expense(CreateExpenseCommand {
                    date,
                    purpose: format!("Sample Purpose {}", month_offset),
                    location: "Sample Location".to_string(),
                    amount: Decimal::new(cents, 2),
                    notes: "Sample Notes".to_string(),
                    category_names: vec![],
                    receipt_image: None,
                })?;
            }
        }

        info!(
            "Seeded {} sample expenses",
            SAMPLE_MONTHS * SAMPLE_EXPENSES_PER_MONTH
        );
        Ok(())
    }
}
