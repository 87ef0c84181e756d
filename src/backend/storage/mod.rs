//! Storage layer: abstraction traits plus the CSV/YAML implementation.

pub mod csv;
pub mod error;
pub mod traits;

pub use error::StorageError;
pub use traits::{AppSettings, CategoryStorage, Connection, ExpenseStorage, SettingsStorage};
