//! Category domain logic.
//!
//! Two resolve flows exist on purpose, mirroring how the app actually
//! behaves: the expense save path matches names exactly (so "food" and
//! "Food" are distinct), while the category editor matches ignoring case
//! and only creates a category when no case-variant exists.

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::backend::domain::models::category::Category;
use crate::backend::storage::error::StorageError;
use crate::backend::storage::traits::{CategoryStorage, Connection};

#[derive(Clone)]
pub struct CategoryService<C: Connection> {
    category_repository: C::CategoryRepository,
}

impl<C: Connection> CategoryService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let category_repository = connection.create_category_repository();
        Self {
            category_repository,
        }
    }

    /// Resolve a category by exact name, creating it when absent.
    ///
    /// This is the expense save path. A failed lookup is reported as a
    /// category-resolution failure so callers can tell it apart from the
    /// expense write itself.
    pub fn resolve_or_create(&self, name: &str) -> Result<Category> {
        let existing = self
            .category_repository
            .get_category_by_name(name)
            .map_err(|e| StorageError::category_resolution(name, e))?;

        if let Some(category) = existing {
            return Ok(category);
        }

        let category = Category::new(name);
        self.category_repository.store_category(&category)?;
        info!("Created category '{}'", name);
        Ok(category)
    }

    /// Resolve a category ignoring case, creating it when no case-variant
    /// exists. This is the category-editor path.
    ///
    /// Returns the category and whether it was newly created.
    pub fn add_or_select(&self, name: &str) -> Result<(Category, bool)> {
        let existing = self
            .category_repository
            .find_category_ignore_case(name)
            .map_err(|e| StorageError::category_resolution(name, e))?;

        if let Some(category) = existing {
            return Ok((category, false));
        }

        let category = Category::new(name);
        self.category_repository.store_category(&category)?;
        info!("Created category '{}'", name);
        Ok((category, true))
    }

    /// All categories, ordered by name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.category_repository.list_categories()?)
    }
}
