//! Outlay Core Library
//!
//! Shared functionality for the Outlay expense tracker:
//! - Category catalog with monthly budgets
//! - Record store contract and its SQLite implementation
//! - Monthly aggregation and budget alerts
//! - Atomic bulk CSV import with duplicate detection
//! - Single-record service and monthly report assembly

pub mod alerts;
pub mod catalog;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod records;
pub mod report;
pub mod store;
pub mod summary;

pub use alerts::{evaluate_budgets, AlertGenerator, WITHIN_BUDGET_MESSAGE};
pub use catalog::{CategoryCatalog, CategoryEntry};
pub use db::Database;
pub use error::{Error, Result, ValidationError};
pub use import::{import_csv, import_csv_detailed, parse_date, DEDUP_WINDOW};
pub use models::{
    Alert, AlertKind, AggregatedValue, CategoryAggregates, FinancialRecord, ImportOutcome,
    RecordCriteria, RecordPage, SkipReason, SkippedRow,
};
pub use records::RecordService;
pub use report::MonthlyReport;
pub use store::{RecordStore, TransactionalStore};
pub use summary::MonthlySummary;
