use csv::{Reader, Writer};
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use uuid::Uuid;

use super::connection::CsvConnection;
use crate::backend::domain::models::category::Category;
use crate::backend::storage::error::StorageError;
use crate::backend::storage::traits::CategoryStorage;

/// CSV-based category repository
///
/// Categories are a flat `id,name` file. Lookups come in two flavors
/// because the app's save flow matches names exactly while the category
/// editor matches ignoring case.
#[derive(Clone)]
pub struct CategoryRepository {
    connection: CsvConnection,
}

impl CategoryRepository {
    /// Create a new CSV category repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_categories(&self) -> Result<Vec<Category>, StorageError> {
        self.connection
            .ensure_categories_file_exists()
            .map_err(|e| StorageError::read("category", e))?;

        let file_path = self.connection.categories_file_path();
        let file = File::open(&file_path).map_err(|e| StorageError::read("category", e))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut categories = Vec::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| StorageError::read("category", e))?;
            let raw_id = record.get(0).unwrap_or("");
            let id = Uuid::parse_str(raw_id).map_err(|e| {
                StorageError::read("category", format!("bad id '{}': {}", raw_id, e))
            })?;
            categories.push(Category {
                id,
                name: record.get(1).unwrap_or("").to_string(),
            });
        }

        Ok(categories)
    }

    fn write_categories(&self, categories: &[Category]) -> Result<(), StorageError> {
        let file_path = self.connection.categories_file_path();
        let temp_path = file_path.with_extension("csv.tmp");

        let write = || -> anyhow::Result<()> {
            if let Some(parent) = temp_path.parent() {
                if !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            let file = File::create(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            csv_writer.write_record(["id", "name"])?;
            for category in categories {
                csv_writer.write_record([category.id.to_string(), category.name.clone()])?;
            }
            csv_writer.flush()?;
            Ok(())
        };

        write().map_err(|e| StorageError::write("category", e))?;
        fs::rename(&temp_path, &file_path).map_err(|e| StorageError::write("category", e))?;
        Ok(())
    }
}

impl CategoryStorage for CategoryRepository {
    fn store_category(&self, category: &Category) -> Result<(), StorageError> {
        let mut categories = self.read_categories()?;
        categories.push(category.clone());
        self.write_categories(&categories)?;
        debug!("Stored category '{}' ({})", category.name, category.id);
        Ok(())
    }

    fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, StorageError> {
        let categories = self.read_categories()?;
        Ok(categories.into_iter().find(|c| c.name == name))
    }

    fn find_category_ignore_case(&self, name: &str) -> Result<Option<Category>, StorageError> {
        let categories = self.read_categories()?;
        Ok(categories
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name)))
    }

    fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut categories = self.read_categories()?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}
