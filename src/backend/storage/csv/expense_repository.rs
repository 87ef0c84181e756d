use csv::{Reader, Writer};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use uuid::Uuid;

use super::connection::CsvConnection;
use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::error::StorageError;
use crate::backend::storage::traits::ExpenseStorage;

/// Separator for the multi-valued `categories` CSV field
const CATEGORY_ID_SEPARATOR: char = ';';

/// CSV-based expense repository
///
/// Reads and rewrites `expenses.csv` as a whole; receipt images live as
/// individual JPEG files under `receipts/`. Rewrites go through a temp
/// file and rename so a crashed write never leaves a truncated file.
#[derive(Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    /// Create a new CSV expense repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all expenses from the CSV file in file order
    fn read_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        self.connection
            .ensure_expenses_file_exists()
            .map_err(|e| StorageError::read("expense", e))?;

        let file_path = self.connection.expenses_file_path();
        let file = File::open(&file_path).map_err(|e| StorageError::read("expense", e))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut expenses = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| StorageError::read("expense", e))?;
            expenses.push(Self::parse_record(&record)?);
        }

        Ok(expenses)
    }

    fn parse_record(record: &csv::StringRecord) -> Result<Expense, StorageError> {
        let field = |index: usize| record.get(index).unwrap_or("");

        let id = Uuid::parse_str(field(0))
            .map_err(|e| StorageError::read("expense", format!("bad id '{}': {}", field(0), e)))?;
        let date = chrono::NaiveDate::parse_from_str(field(1), "%Y-%m-%d").map_err(|e| {
            StorageError::read("expense", format!("bad date '{}': {}", field(1), e))
        })?;
        let amount = field(4).parse::<rust_decimal::Decimal>().map_err(|e| {
            StorageError::read("expense", format!("bad amount '{}': {}", field(4), e))
        })?;

        let receipt = match field(6) {
            "" => None,
            name => Some(name.to_string()),
        };

        let mut category_ids = Vec::new();
        for part in field(7).split(CATEGORY_ID_SEPARATOR).filter(|p| !p.is_empty()) {
            let category_id = Uuid::parse_str(part).map_err(|e| {
                StorageError::read("expense", format!("bad category id '{}': {}", part, e))
            })?;
            category_ids.push(category_id);
        }

        Ok(Expense {
            id,
            date,
            purpose: field(2).to_string(),
            location: field(3).to_string(),
            amount,
            notes: field(5).to_string(),
            receipt,
            category_ids,
        })
    }

    /// Rewrite the whole CSV file atomically (temp file, then rename)
    fn write_expenses(&self, expenses: &[Expense]) -> Result<(), StorageError> {
        let file_path = self.connection.expenses_file_path();
        let temp_path = file_path.with_extension("csv.tmp");

        self.write_expenses_to(&temp_path, expenses)
            .map_err(|e| StorageError::write("expense", e))?;
        fs::rename(&temp_path, &file_path).map_err(|e| StorageError::write("expense", e))?;
        Ok(())
    }

    fn write_expenses_to(&self, path: &PathBuf, expenses: &[Expense]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        let mut csv_writer = Writer::from_writer(BufWriter::new(file));

        csv_writer.write_record([
            "id",
            "date",
            "purpose",
            "location",
            "amount",
            "notes",
            "receipt",
            "categories",
        ])?;

        for expense in expenses {
            let categories = expense
                .category_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(&CATEGORY_ID_SEPARATOR.to_string());

            csv_writer.write_record([
                expense.id.to_string(),
                expense.date.format("%Y-%m-%d").to_string(),
                expense.purpose.clone(),
                expense.location.clone(),
                expense.amount.to_string(),
                expense.notes.clone(),
                expense.receipt.clone().unwrap_or_default(),
                categories,
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    fn receipt_path(&self, file_name: &str) -> PathBuf {
        self.connection.receipts_directory().join(file_name)
    }

    /// Remove the receipt file for an expense if one exists on disk
    fn remove_receipt_file(&self, expense: &Expense) {
        if let Some(file_name) = &expense.receipt {
            let path = self.receipt_path(file_name);
            if path.exists() {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Failed to remove receipt file {}: {}", path.display(), e);
                }
            }
        }
    }
}

impl ExpenseStorage for ExpenseRepository {
    fn store_expense(&self, expense: &Expense) -> Result<(), StorageError> {
        let mut expenses = self.read_expenses()?;
        expenses.push(expense.clone());
        self.write_expenses(&expenses)?;
        debug!("Stored expense {}", expense.id);
        Ok(())
    }

    fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, StorageError> {
        let expenses = self.read_expenses()?;
        Ok(expenses.into_iter().find(|e| e.id == expense_id))
    }

    fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
        let mut expenses = self.read_expenses()?;
        // Stable sort: same-day expenses keep their insertion order.
        expenses.sort_by_key(|e| e.date);
        Ok(expenses)
    }

    fn update_expense(&self, expense: &Expense) -> Result<bool, StorageError> {
        let mut expenses = self.read_expenses()?;
        match expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => {
                *existing = expense.clone();
            }
            None => return Ok(false),
        }
        self.write_expenses(&expenses)?;
        debug!("Updated expense {}", expense.id);
        Ok(true)
    }

    fn delete_expense(&self, expense_id: Uuid) -> Result<bool, StorageError> {
        let mut expenses = self.read_expenses()?;
        let Some(position) = expenses.iter().position(|e| e.id == expense_id) else {
            return Ok(false);
        };
        let removed = expenses.remove(position);
        self.write_expenses(&expenses)?;
        self.remove_receipt_file(&removed);
        info!("Deleted expense {}", expense_id);
        Ok(true)
    }

    fn delete_all_expenses(&self) -> Result<u32, StorageError> {
        let expenses = self.read_expenses()?;
        let count = expenses.len() as u32;
        self.write_expenses(&[])?;
        for expense in &expenses {
            self.remove_receipt_file(expense);
        }
        info!("Deleted all {} expenses", count);
        Ok(count)
    }

    fn store_receipt_image(&self, expense_id: Uuid, bytes: &[u8]) -> Result<String, StorageError> {
        self.connection
            .ensure_receipts_directory_exists()
            .map_err(|e| StorageError::write("receipt", e))?;

        // Match the original app: whatever the picker produced is decoded
        // and stored as JPEG.
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| StorageError::write("receipt", format!("not a decodable image: {}", e)))?;

        let file_name = format!("{}.jpg", expense_id);
        let path = self.receipt_path(&file_name);
        decoded
            .to_rgb8()
            .save(&path)
            .map_err(|e| StorageError::write("receipt", e))?;

        debug!("Stored receipt image {}", path.display());
        Ok(file_name)
    }

    fn load_receipt_image(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.receipt_path(file_name)).map_err(|e| StorageError::read("receipt", e))
    }
}
