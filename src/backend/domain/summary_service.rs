//! Summary domain logic for the expense tracker.
//!
//! This service owns the state behind the list header: the full expense
//! list, the set of expense ids currently scrolled into view, and the
//! Period/Annual mode, from which it derives the displayed period label
//! and the running total. The UI only reports visibility changes and mode
//! toggles; every computation lives here.

use anyhow::Result;
use chrono::{Datelike, Local};
use log::warn;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::backend::domain::models::expense::Expense;
use crate::backend::storage::traits::{Connection, ExpenseStorage};

/// Label shown when nothing is visible in Period mode
pub const NO_EXPENSES_LABEL: &str = "No Expenses";
/// Label shown in Annual mode
pub const ANNUAL_TOTAL_LABEL: &str = "Annual Total";

/// Which selection the total is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsMode {
    /// Total over the expenses currently scrolled into view
    Period,
    /// Total over every expense dated in the current calendar year
    Annual,
}

/// Immutable view of the derived summary values
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub mode: TotalsMode,
    pub displayed_period: String,
    pub total: Decimal,
}

struct SummaryState {
    /// Sorted ascending by date; the sort order is load-bearing for the
    /// period label (first/last are min/max date)
    expenses: Vec<Expense>,
    /// Always a subset of the ids in `expenses`
    visible_ids: HashSet<Uuid>,
    mode: TotalsMode,
    displayed_period: String,
    total: Decimal,
}

/// Service deriving the displayed period and total from the visible window
#[derive(Clone)]
pub struct SummaryService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    state: Arc<Mutex<SummaryState>>,
}

impl<C: Connection> SummaryService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let expense_repository = connection.create_expense_repository();
        let mut state = SummaryState {
            expenses: Vec::new(),
            visible_ids: HashSet::new(),
            mode: TotalsMode::Period,
            displayed_period: String::new(),
            total: Decimal::ZERO,
        };
        Self::recompute(&mut state);

        Self {
            expense_repository,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Re-read the full expense list from the store and recompute.
    ///
    /// On a read failure the previous list and derived values are kept
    /// untouched and the error is returned for the caller to surface.
    pub fn refresh(&self) -> Result<()> {
        let mut expenses = match self.expense_repository.list_expenses() {
            Ok(expenses) => expenses,
            Err(e) => {
                warn!("Failed to refresh expense list, keeping previous state: {}", e);
                return Err(e.into());
            }
        };
        expenses.sort_by_key(|e| e.date);

        let mut state = self.state.lock().unwrap();
        state.expenses = expenses;

        // Expenses may have been deleted since the UI last reported
        // visibility; the visible set stays a subset of the list.
        let known: HashSet<Uuid> = state.expenses.iter().map(|e| e.id).collect();
        state.visible_ids.retain(|id| known.contains(id));

        Self::recompute(&mut state);
        Ok(())
    }

    /// Replace the set of visible expense ids as reported by the UI.
    ///
    /// A set equal in content to the current one is a no-op, so repeated
    /// identical scroll reports recompute at most once. Returns whether a
    /// recomputation happened.
    pub fn set_visible_expenses(&self, visible_ids: HashSet<Uuid>) -> bool {
        let mut state = self.state.lock().unwrap();

        let known: HashSet<Uuid> = state.expenses.iter().map(|e| e.id).collect();
        let pruned: HashSet<Uuid> = visible_ids
            .into_iter()
            .filter(|id| known.contains(id))
            .collect();

        if pruned == state.visible_ids {
            return false;
        }

        state.visible_ids = pruned;
        Self::recompute(&mut state);
        true
    }

    /// Flip between Period and Annual totals and recompute immediately
    pub fn toggle_totals_mode(&self) -> TotalsMode {
        let mut state = self.state.lock().unwrap();
        state.mode = match state.mode {
            TotalsMode::Period => TotalsMode::Annual,
            TotalsMode::Annual => TotalsMode::Period,
        };
        Self::recompute(&mut state);
        state.mode
    }

    pub fn mode(&self) -> TotalsMode {
        self.state.lock().unwrap().mode
    }

    /// Current derived values for the header
    pub fn snapshot(&self) -> SummarySnapshot {
        let state = self.state.lock().unwrap();
        SummarySnapshot {
            mode: state.mode,
            displayed_period: state.displayed_period.clone(),
            total: state.total,
        }
    }

    /// The current expense list, sorted ascending by date
    pub fn expenses(&self) -> Vec<Expense> {
        self.state.lock().unwrap().expenses.clone()
    }

    fn recompute(state: &mut SummaryState) {
        let visible: Vec<&Expense> = state
            .expenses
            .iter()
            .filter(|e| state.visible_ids.contains(&e.id))
            .collect();

        match state.mode {
            TotalsMode::Annual => {
                let current_year = Local::now().year();
                state.displayed_period = ANNUAL_TOTAL_LABEL.to_string();
                state.total = state
                    .expenses
                    .iter()
                    .filter(|e| e.is_in_year(current_year))
                    .map(|e| e.amount)
                    .sum();
            }
            TotalsMode::Period => {
                state.displayed_period = Self::period_label(&visible);
                state.total = visible.iter().map(|e| e.amount).sum();
            }
        }
    }

    /// Label for the visible window. `visible` preserves the list's date
    /// order, so first and last are the min and max dates.
    fn period_label(visible: &[&Expense]) -> String {
        let (Some(first), Some(last)) = (visible.first(), visible.last()) else {
            return NO_EXPENSES_LABEL.to_string();
        };

        let first_month = first.date.format("%B");
        let last_month = last.date.format("%B");

        if first.date.year() == last.date.year() {
            if first.date.month() == last.date.month() {
                first_month.to_string()
            } else {
                format!("{} - {}", first_month, last_month)
            }
        } else {
            format!(
                "{} {} - {} {}",
                first_month,
                first.date.year(),
                last_month,
                last.date.year()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::category_service::CategoryService;
    use crate::backend::domain::commands::expenses::CreateExpenseCommand;
    use crate::backend::domain::expense_service::ExpenseService;
    use crate::backend::storage::csv::test_utils::TestEnvironment;
    use crate::backend::storage::csv::CsvConnection;
    use crate::backend::storage::error::StorageError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct TestFixture {
        expense_service: ExpenseService<CsvConnection>,
        summary_service: SummaryService<CsvConnection>,
        _env: TestEnvironment,
    }

    fn create_test_fixture() -> TestFixture {
        let env = TestEnvironment::new().unwrap();
        let connection = Arc::new(env.connection.clone());
        let category_service = CategoryService::new(connection.clone());
        let expense_service = ExpenseService::new(connection.clone(), category_service);
        let summary_service = SummaryService::new(connection);
        TestFixture {
            expense_service,
            summary_service,
            _env: env,
        }
    }

    fn add_expense(fixture: &TestFixture, date: NaiveDate, amount: &str) -> Uuid {
        fixture
            .expense_service
            .create_expense(CreateExpenseCommand {
                date,
                purpose: "Test".to_string(),
                location: "Test".to_string(),
                amount: amount.parse().unwrap(),
                notes: String::new(),
                category_names: vec![],
                receipt_image: None,
            })
            .unwrap()
            .id
    }

    /// Three expenses across two months of one year: Jan 10 (10),
    /// Jan 20 (20), Mar 5 (5).
    fn seed_scenario(fixture: &TestFixture, year: i32) -> Vec<Uuid> {
        let ids = vec![
            add_expense(fixture, NaiveDate::from_ymd_opt(year, 1, 10).unwrap(), "10"),
            add_expense(fixture, NaiveDate::from_ymd_opt(year, 1, 20).unwrap(), "20"),
            add_expense(fixture, NaiveDate::from_ymd_opt(year, 3, 5).unwrap(), "5"),
        ];
        fixture.summary_service.refresh().unwrap();
        ids
    }

    #[test]
    fn test_initial_state_shows_no_expenses() {
        let fixture = create_test_fixture();
        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.mode, TotalsMode::Period);
        assert_eq!(snapshot.displayed_period, NO_EXPENSES_LABEL);
        assert_eq!(snapshot.total, Decimal::ZERO);
    }

    #[test]
    fn test_all_visible_spanning_months_in_one_year() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);

        assert!(fixture
            .summary_service
            .set_visible_expenses(ids.into_iter().collect()));

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, "January - March");
        assert_eq!(snapshot.total, Decimal::from(35));
    }

    #[test]
    fn test_single_visible_expense_shows_single_month() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);

        fixture
            .summary_service
            .set_visible_expenses([ids[0]].into_iter().collect());

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, "January");
        assert_eq!(snapshot.total, Decimal::from(10));
    }

    #[test]
    fn test_no_visible_expenses_shows_no_expenses_label() {
        let fixture = create_test_fixture();
        seed_scenario(&fixture, 2024);

        fixture.summary_service.set_visible_expenses(HashSet::new());

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, NO_EXPENSES_LABEL);
        assert_eq!(snapshot.total, Decimal::ZERO);
    }

    #[test]
    fn test_period_label_across_years_includes_both_years() {
        let fixture = create_test_fixture();
        let december = add_expense(
            &fixture,
            NaiveDate::from_ymd_opt(2023, 12, 28).unwrap(),
            "8",
        );
        let january = add_expense(&fixture, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), "2");
        fixture.summary_service.refresh().unwrap();

        fixture
            .summary_service
            .set_visible_expenses([december, january].into_iter().collect());

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, "December 2023 - January 2024");
        assert_eq!(snapshot.total, Decimal::from(10));
    }

    #[test]
    fn test_identical_visible_set_recomputes_at_most_once() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);
        let set: HashSet<Uuid> = ids.into_iter().collect();

        assert!(fixture.summary_service.set_visible_expenses(set.clone()));
        // Same content, different HashSet instance: must be a no-op.
        assert!(!fixture.summary_service.set_visible_expenses(set));
    }

    #[test]
    fn test_unknown_ids_are_pruned_from_visible_set() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);

        let mut with_stranger: HashSet<Uuid> = [ids[0]].into_iter().collect();
        with_stranger.insert(Uuid::new_v4());
        fixture.summary_service.set_visible_expenses(with_stranger);

        // Only the known id counts.
        assert_eq!(fixture.summary_service.snapshot().total, Decimal::from(10));
    }

    #[test]
    fn test_annual_total_ignores_visibility() {
        let fixture = create_test_fixture();
        let current_year = Local::now().year();

        seed_scenario(&fixture, current_year);
        // An expense from last year never counts toward the annual total.
        add_expense(
            &fixture,
            NaiveDate::from_ymd_opt(current_year - 1, 6, 1).unwrap(),
            "100",
        );
        fixture.summary_service.refresh().unwrap();
        fixture.summary_service.set_visible_expenses(HashSet::new());

        let mode = fixture.summary_service.toggle_totals_mode();
        assert_eq!(mode, TotalsMode::Annual);

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, ANNUAL_TOTAL_LABEL);
        assert_eq!(snapshot.total, Decimal::from(35));
    }

    #[test]
    fn test_double_toggle_restores_label_and_total() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);
        fixture
            .summary_service
            .set_visible_expenses(ids.into_iter().collect());

        let before = fixture.summary_service.snapshot();
        fixture.summary_service.toggle_totals_mode();
        fixture.summary_service.toggle_totals_mode();
        let after = fixture.summary_service.snapshot();

        assert_eq!(before, after);
        assert_eq!(fixture.summary_service.mode(), TotalsMode::Period);
    }

    #[test]
    fn test_refresh_recomputes_total_for_still_visible_expense() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);
        fixture
            .summary_service
            .set_visible_expenses(ids.iter().copied().collect());
        assert_eq!(fixture.summary_service.snapshot().total, Decimal::from(35));

        // Edit an amount without touching the visible set; the displayed
        // total follows on the next refresh.
        let expenses = fixture.expense_service.list_expenses().unwrap();
        let first = expenses.iter().find(|e| e.id == ids[0]).unwrap();
        fixture
            .expense_service
            .update_expense(crate::backend::domain::commands::expenses::UpdateExpenseCommand {
                expense_id: first.id,
                date: first.date,
                purpose: first.purpose.clone(),
                location: first.location.clone(),
                amount: Decimal::from(50),
                notes: first.notes.clone(),
                category_names: vec![],
                receipt_image: None,
            })
            .unwrap();
        fixture.summary_service.refresh().unwrap();

        assert_eq!(fixture.summary_service.snapshot().total, Decimal::from(75));
    }

    #[test]
    fn test_refresh_prunes_deleted_expense_from_visible_set() {
        let fixture = create_test_fixture();
        let ids = seed_scenario(&fixture, 2024);
        fixture
            .summary_service
            .set_visible_expenses(ids.iter().copied().collect());

        fixture.expense_service.delete_expense(ids[2]).unwrap();
        fixture.summary_service.refresh().unwrap();

        let snapshot = fixture.summary_service.snapshot();
        assert_eq!(snapshot.displayed_period, "January");
        assert_eq!(snapshot.total, Decimal::from(30));
    }

    #[test]
    fn test_refresh_list_is_sorted_after_any_sequence_of_writes() {
        let fixture = create_test_fixture();
        add_expense(&fixture, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "1");
        add_expense(&fixture, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(), "2");
        let middle = add_expense(&fixture, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "3");
        fixture.expense_service.delete_expense(middle).unwrap();
        add_expense(&fixture, NaiveDate::from_ymd_opt(2022, 5, 1).unwrap(), "4");
        fixture.summary_service.refresh().unwrap();

        let dates: Vec<NaiveDate> = fixture
            .summary_service
            .expenses()
            .iter()
            .map(|e| e.date)
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    // A connection whose expense reads can be switched to fail, for the
    // list-unchanged contract.
    #[derive(Clone)]
    struct FlakyConnection {
        inner: CsvConnection,
        fail_reads: Arc<AtomicBool>,
    }

    #[derive(Clone)]
    struct FlakyExpenseRepository {
        inner: <CsvConnection as Connection>::ExpenseRepository,
        fail_reads: Arc<AtomicBool>,
    }

    impl ExpenseStorage for FlakyExpenseRepository {
        fn store_expense(&self, expense: &Expense) -> Result<(), StorageError> {
            self.inner.store_expense(expense)
        }
        fn get_expense(&self, expense_id: Uuid) -> Result<Option<Expense>, StorageError> {
            self.inner.get_expense(expense_id)
        }
        fn list_expenses(&self) -> Result<Vec<Expense>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::read("expense", "disk on fire"));
            }
            self.inner.list_expenses()
        }
        fn update_expense(&self, expense: &Expense) -> Result<bool, StorageError> {
            self.inner.update_expense(expense)
        }
        fn delete_expense(&self, expense_id: Uuid) -> Result<bool, StorageError> {
            self.inner.delete_expense(expense_id)
        }
        fn delete_all_expenses(&self) -> Result<u32, StorageError> {
            self.inner.delete_all_expenses()
        }
        fn store_receipt_image(&self, expense_id: Uuid, bytes: &[u8]) -> Result<String, StorageError> {
            self.inner.store_receipt_image(expense_id, bytes)
        }
        fn load_receipt_image(&self, file_name: &str) -> Result<Vec<u8>, StorageError> {
            self.inner.load_receipt_image(file_name)
        }
    }

    impl Connection for FlakyConnection {
        type ExpenseRepository = FlakyExpenseRepository;
        type CategoryRepository = <CsvConnection as Connection>::CategoryRepository;
        type SettingsRepository = <CsvConnection as Connection>::SettingsRepository;

        fn create_expense_repository(&self) -> Self::ExpenseRepository {
            FlakyExpenseRepository {
                inner: self.inner.create_expense_repository(),
                fail_reads: self.fail_reads.clone(),
            }
        }
        fn create_category_repository(&self) -> Self::CategoryRepository {
            self.inner.create_category_repository()
        }
        fn create_settings_repository(&self) -> Self::SettingsRepository {
            self.inner.create_settings_repository()
        }
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let env = TestEnvironment::new().unwrap();
        let fail_reads = Arc::new(AtomicBool::new(false));
        let connection = FlakyConnection {
            inner: env.connection.clone(),
            fail_reads: fail_reads.clone(),
        };

        let csv_connection = Arc::new(env.connection.clone());
        let category_service = CategoryService::new(csv_connection.clone());
        let expense_service = ExpenseService::new(csv_connection, category_service);
        let summary_service = SummaryService::new(Arc::new(connection));

        let expense = expense_service
            .create_expense(CreateExpenseCommand {
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                purpose: "Test".to_string(),
                location: "Test".to_string(),
                amount: "10".parse().unwrap(),
                notes: String::new(),
                category_names: vec![],
                receipt_image: None,
            })
            .unwrap();
        summary_service.refresh().unwrap();
        summary_service.set_visible_expenses([expense.id].into_iter().collect());
        let before = summary_service.snapshot();

        fail_reads.store(true, Ordering::SeqCst);
        assert!(summary_service.refresh().is_err());

        assert_eq!(summary_service.snapshot(), before);
        assert_eq!(summary_service.expenses().len(), 1);
    }
}
