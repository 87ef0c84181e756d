//! Domain layer: models, commands, and the services that own all
//! business logic.

pub mod analysis_service;
pub mod category_service;
pub mod commands;
pub mod expense_service;
pub mod models;
pub mod pro_service;
pub mod receipt_scan;
pub mod summary_service;

pub use analysis_service::AnalysisService;
pub use category_service::CategoryService;
pub use expense_service::ExpenseService;
pub use pro_service::{ProService, PurchaseEvent};
pub use receipt_scan::{ReceiptScan, ReceiptScanner};
pub use summary_service::{SummaryService, SummarySnapshot, TotalsMode};
