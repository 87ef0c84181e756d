//! Command types for expense operations.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Input for creating an expense from the add-expense form
#[derive(Debug, Clone)]
pub struct CreateExpenseCommand {
    pub date: NaiveDate,
    pub purpose: String,
    pub location: String,
    pub amount: Decimal,
    pub notes: String,
    /// Category names as submitted; duplicates are tolerated and link once
    pub category_names: Vec<String>,
    /// Raw receipt image bytes, if a photo was attached
    pub receipt_image: Option<Vec<u8>>,
}

/// Input for the edit form. Every scalar field overwrites unconditionally
/// and the category links are rebuilt from `category_names`; only the
/// receipt image is kept when no new one is submitted.
#[derive(Debug, Clone)]
pub struct UpdateExpenseCommand {
    pub expense_id: Uuid,
    pub date: NaiveDate,
    pub purpose: String,
    pub location: String,
    pub amount: Decimal,
    pub notes: String,
    pub category_names: Vec<String>,
    pub receipt_image: Option<Vec<u8>>,
}
