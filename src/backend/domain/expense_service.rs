//! Expense domain logic: the adapter between form input and the store.
//!
//! Every save resolves the submitted category names to links first and
//! only then writes the expense, so no observable state ever holds an
//! expense pointing at a missing category. All persistence failures
//! propagate to the caller; nothing here is log-and-swallow.

use anyhow::Result;
use log::info;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::domain::category_service::CategoryService;
use crate::backend::domain::commands::expenses::{CreateExpenseCommand, UpdateExpenseCommand};
use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::error::StorageError;
use crate::backend::storage::traits::{Connection, ExpenseStorage};

#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    category_service: CategoryService<C>,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: Arc<C>, category_service: CategoryService<C>) -> Self {
        let expense_repository = connection.create_expense_repository();
        Self {
            expense_repository,
            category_service,
        }
    }

    /// Create a new expense from the add form
    pub fn create_expense(&self, command: CreateExpenseCommand) -> Result<Expense> {
        let expense_id = Uuid::new_v4();
        let category_ids = self.resolve_category_links(&command.category_names)?;

        let receipt = match &command.receipt_image {
            Some(bytes) => Some(
                self.expense_repository
                    .store_receipt_image(expense_id, bytes)?,
            ),
            None => None,
        };

        let expense = Expense {
            id: expense_id,
            date: command.date,
            purpose: command.purpose,
            location: command.location,
            amount: command.amount,
            notes: command.notes,
            receipt,
            category_ids,
        };

        self.expense_repository.store_expense(&expense)?;
        info!(
            "Created expense {} ({} on {})",
            expense.id, expense.amount, expense.date
        );
        Ok(expense)
    }

    /// Overwrite every field of an existing expense from the edit form.
    ///
    /// Category links are cleared and rebuilt from the submitted names; a
    /// category that was linked only here and is now omitted simply stays
    /// in the store unlinked. The stored receipt survives unless a new
    /// image is submitted.
    pub fn update_expense(&self, command: UpdateExpenseCommand) -> Result<Expense> {
        let existing = self
            .expense_repository
            .get_expense(command.expense_id)?
            .ok_or_else(|| StorageError::not_found("expense", command.expense_id))?;

        let category_ids = self.resolve_category_links(&command.category_names)?;

        let receipt = match &command.receipt_image {
            Some(bytes) => Some(
                self.expense_repository
                    .store_receipt_image(command.expense_id, bytes)?,
            ),
            None => existing.receipt,
        };

        let expense = Expense {
            id: command.expense_id,
            date: command.date,
            purpose: command.purpose,
            location: command.location,
            amount: command.amount,
            notes: command.notes,
            receipt,
            category_ids,
        };

        if !self.expense_repository.update_expense(&expense)? {
            return Err(StorageError::not_found("expense", command.expense_id).into());
        }
        info!("Updated expense {}", expense.id);
        Ok(expense)
    }

    /// Delete an expense. Linked categories stay untouched.
    pub fn delete_expense(&self, expense_id: Uuid) -> Result<()> {
        if !self.expense_repository.delete_expense(expense_id)? {
            return Err(StorageError::not_found("expense", expense_id).into());
        }
        Ok(())
    }

    /// All expenses, ordered by date ascending
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.expense_repository.list_expenses()?)
    }

    /// Bulk-delete every expense (app reset). Returns the deleted count
    pub fn delete_all_expenses(&self) -> Result<u32> {
        Ok(self.expense_repository.delete_all_expenses()?)
    }

    /// Raw bytes of the expense's stored receipt image, if any
    pub fn load_receipt(&self, expense: &Expense) -> Result<Option<Vec<u8>>> {
        match &expense.receipt {
            Some(file_name) => Ok(Some(self.expense_repository.load_receipt_image(file_name)?)),
            None => Ok(None),
        }
    }

    /// Resolve submitted category names into link ids.
    ///
    /// Duplicate input names are tolerated and link once.
    fn resolve_category_links(&self, category_names: &[String]) -> Result<Vec<Uuid>> {
        let mut linked = HashSet::new();
        let mut category_ids = Vec::new();

        for name in category_names {
            let category = self.category_service.resolve_or_create(name)?;
            if linked.insert(category.id) {
                category_ids.push(category.id);
            }
        }

        Ok(category_ids)
    }
}
