//! Breakdown aggregations for the analysis charts.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use log::warn;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::storage::traits::{CategoryStorage, Connection, ExpenseStorage};

/// Summed amount for one category across all expenses
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

/// Summed amount for one calendar month across all expenses
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

impl MonthlyTotal {
    /// Chart label, e.g. "January 2024"
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%B %Y").to_string(),
            None => format!("{}-{:02}", self.year, self.month),
        }
    }
}

/// Service computing the per-category and per-month chart data
#[derive(Clone)]
pub struct AnalysisService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    category_repository: C::CategoryRepository,
}

impl<C: Connection> AnalysisService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            expense_repository: connection.create_expense_repository(),
            category_repository: connection.create_category_repository(),
        }
    }

    /// Sum amounts per linked category name, ordered by name.
    ///
    /// An expense counts once per linked category; expenses without
    /// categories contribute nothing here.
    pub fn category_breakdown(&self) -> Result<Vec<CategoryTotal>> {
        let names: HashMap<Uuid, String> = self
            .category_repository
            .list_categories()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for expense in self.expense_repository.list_expenses()? {
            for category_id in &expense.category_ids {
                match names.get(category_id) {
                    Some(name) => {
                        *totals.entry(name.clone()).or_insert(Decimal::ZERO) += expense.amount;
                    }
                    None => {
                        warn!(
                            "Expense {} links unknown category {}",
                            expense.id, category_id
                        );
                    }
                }
            }
        }

        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }

    /// Sum amounts per calendar month, in chronological order
    pub fn monthly_breakdown(&self) -> Result<Vec<MonthlyTotal>> {
        let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
        for expense in self.expense_repository.list_expenses()? {
            let key = (expense.date.year(), expense.date.month());
            *totals.entry(key).or_insert(Decimal::ZERO) += expense.amount;
        }

        Ok(totals
            .into_iter()
            .map(|((year, month), total)| MonthlyTotal { year, month, total })
            .collect())
    }
}
