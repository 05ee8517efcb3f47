//! Error types for Outlay

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The record does not exist, is deleted, or belongs to another owner.
    /// Callers map this to an access-denial outcome.
    #[error("Record {0} not found or not accessible")]
    NotFoundOrForbidden(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Record field validation failures, raised by single create/update
/// and reported as skip reasons by the bulk importer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Date cannot be in the future")]
    FutureDate,
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "amount",
            Self::EmptyDescription => "description",
            Self::FutureDate => "date",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
