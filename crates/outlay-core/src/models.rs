//! Domain models for Outlay

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Storage format for record dates (SQLite `strftime` understands it)
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a major-unit amount to minor units (cents)
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert minor units (cents) to a major-unit amount
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// A single financial record (expense) belonging to one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// `None` until persisted
    pub id: Option<i64>,
    pub owner_id: i64,
    pub date: NaiveDateTime,
    /// Category key; catalog membership is only enforced by the bulk importer
    pub category: String,
    /// Amount in minor currency units
    pub amount_cents: i64,
    pub description: String,
    /// Soft-delete marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<NaiveDateTime>,
}

impl FinancialRecord {
    /// Build an unsaved record from a major-unit amount
    ///
    /// The date is truncated to whole seconds, the precision the store keeps.
    pub fn new(
        owner_id: i64,
        date: NaiveDateTime,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            owner_id,
            date: date.trunc_subsecs(0),
            category: category.into(),
            amount_cents: to_cents(amount),
            description: description.into(),
            deleted_at: None,
        }
    }

    /// Amount in major units
    pub fn amount(&self) -> f64 {
        from_cents(self.amount_cents)
    }

    /// Check the record invariants against the given "now"
    pub fn validate(&self, now: NaiveDateTime) -> Result<(), ValidationError> {
        if self.amount_cents <= 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if self.date > now {
            return Err(ValidationError::FutureDate);
        }
        Ok(())
    }

    /// Same entry as `other`: date, description, amount (in cents) and category
    pub fn is_duplicate_of(&self, other: &FinancialRecord) -> bool {
        self.date == other.date
            && self.description == other.description
            && self.amount_cents == other.amount_cents
            && self.category == other.category
    }

    /// Calendar (year, month) the record falls into
    pub fn year_month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }
}

/// Store query criteria: owner scope plus an optional exact calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCriteria {
    pub owner_id: i64,
    /// (year, month): matches that calendar month only, not a range
    pub month: Option<(i32, u32)>,
}

impl RecordCriteria {
    /// All records of an owner
    pub fn owner(owner_id: i64) -> Self {
        Self {
            owner_id,
            month: None,
        }
    }

    /// Records of an owner within one calendar month
    pub fn month(owner_id: i64, year: i32, month: u32) -> Self {
        Self {
            owner_id,
            month: Some((year, month)),
        }
    }
}

/// An aggregated per-category figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedValue {
    /// Major-unit amount
    pub value: f64,
    /// Share in [0, 100]; see `MonthlySummary` for the normalization used
    pub percentage: f64,
}

/// Category key -> aggregated value
pub type CategoryAggregates = BTreeMap<String, AggregatedValue>;

/// Budget alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Success,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget alert for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }
}

/// One page of a month's records
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub items: Vec<FinancialRecord>,
    pub total: i64,
    /// 1-based page number
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Why an import row was not persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than four fields
    InsufficientColumns,
    /// Category key not in the catalog
    UnknownCategory,
    /// Date field could not be parsed (message from the parser)
    InvalidDate(String),
    /// Amount field could not be parsed (message from the parser)
    InvalidAmount(String),
    /// Parsed fine but breaks a record invariant
    Invalid(ValidationError),
    /// Same entry already stored for this owner and month
    Duplicate,
    /// The CSV reader rejected the row itself
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientColumns => write!(f, "insufficient columns"),
            Self::UnknownCategory => write!(f, "unknown category"),
            Self::InvalidDate(msg) | Self::InvalidAmount(msg) | Self::Malformed(msg) => {
                write!(f, "{}", msg)
            }
            Self::Invalid(err) => write!(f, "{}", err),
            Self::Duplicate => write!(f, "duplicate entry"),
        }
    }
}

/// A row the importer skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line number in the payload
    pub line: u64,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Result of a committed bulk import
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Rows committed
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportOutcome {
    /// Skip diagnostics joined with "; "
    pub fn skip_summary(&self) -> String {
        self.skipped
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_to_cents_rounds() {
        assert_eq!(to_cents(12.3), 1230);
        assert_eq!(to_cents(0.1 + 0.2), 30);
        assert_eq!(to_cents(19.999), 2000);
        assert_eq!(from_cents(1230), 12.3);
    }

    #[test]
    fn test_validate() {
        let now = at(2025, 6, 1);
        let ok = FinancialRecord::new(1, at(2025, 5, 1), "groceries", 10.0, "Milk");
        assert_eq!(ok.validate(now), Ok(()));

        let zero = FinancialRecord::new(1, at(2025, 5, 1), "groceries", 0.0, "Milk");
        assert_eq!(zero.validate(now), Err(ValidationError::NonPositiveAmount));

        let blank = FinancialRecord::new(1, at(2025, 5, 1), "groceries", 1.0, "   ");
        assert_eq!(blank.validate(now), Err(ValidationError::EmptyDescription));

        let future = FinancialRecord::new(1, at(2025, 7, 1), "groceries", 1.0, "Milk");
        assert_eq!(future.validate(now), Err(ValidationError::FutureDate));
    }

    #[test]
    fn test_new_drops_subsecond_precision() {
        let precise = at(2025, 3, 1).with_nanosecond(500_000_000).unwrap();
        let record = FinancialRecord::new(1, precise, "groceries", 10.0, "Milk");
        assert_eq!(record.date, at(2025, 3, 1));
    }

    #[test]
    fn test_skip_summary_format() {
        let outcome = ImportOutcome {
            imported: 1,
            skipped: vec![
                SkippedRow {
                    line: 2,
                    reason: SkipReason::InsufficientColumns,
                },
                SkippedRow {
                    line: 5,
                    reason: SkipReason::Duplicate,
                },
            ],
        };
        assert_eq!(
            outcome.skip_summary(),
            "line 2: insufficient columns; line 5: duplicate entry"
        );
    }

    #[test]
    fn test_alert_serializes_kind_lowercase() {
        let json = serde_json::to_string(&Alert::warning("x")).unwrap();
        assert_eq!(json, r#"{"kind":"warning","message":"x"}"#);
    }
}
