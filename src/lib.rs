//! # Expense Tracker Core
//!
//! Headless model and service layer for a personal expense tracker. The UI
//! (whatever renders it) binds to [`backend::Backend`], which wires the
//! domain services over a file-based storage backend:
//!
//! - `backend::domain` holds the expense/category models and the services
//!   that own all business logic: expense CRUD with category resolution,
//!   the period/annual summary state, analysis breakdowns, receipt text
//!   extraction, and pro-unlock state.
//! - `backend::storage` holds the storage traits and the CSV/YAML
//!   repository implementation.

pub mod backend;

pub use backend::Backend;
