//! Domain model for an expense.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    /// Calendar date the expense was incurred
    pub date: NaiveDate,
    pub purpose: String,
    pub location: String,
    /// May be negative or zero; nothing validates the sign
    pub amount: Decimal,
    pub notes: String,
    /// File name of the stored receipt image, if one was attached
    pub receipt: Option<String>,
    /// Linked categories, no duplicates
    pub category_ids: Vec<Uuid>,
}

impl Expense {
    /// Whether the expense falls in the given calendar year
    pub fn is_in_year(&self, year: i32) -> bool {
        use chrono::Datelike;
        self.date.year() == year
    }
}
