//! Monthly report: everything a dashboard needs for one owner's month

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::alerts::AlertGenerator;
use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::models::{Alert, CategoryAggregates};
use crate::records::RecordService;
use crate::store::RecordStore;
use crate::summary::MonthlySummary;

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub years: Vec<i32>,
    pub total_expenditure: f64,
    pub totals: CategoryAggregates,
    pub averages: CategoryAggregates,
    /// Only populated when the report covers the current month
    pub alerts: Vec<Alert>,
}

impl MonthlyReport {
    pub fn build<S: RecordStore + ?Sized>(
        store: &S,
        catalog: &CategoryCatalog,
        owner_id: i64,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        let summary = MonthlySummary::new(store);

        let years = RecordService::new(store).available_years(owner_id, today)?;
        let total_expenditure = summary.compute_total_expenditure(owner_id, year, month)?;
        let totals = summary.compute_per_category_totals(owner_id, year, month)?;
        let averages = summary.compute_per_category_averages(owner_id, year, month)?;

        let alerts = if (year, month) == (today.year(), today.month()) {
            AlertGenerator::new(store, catalog).generate(owner_id, year, month)?
        } else {
            Vec::new()
        };

        Ok(Self {
            year,
            month,
            years,
            total_expenditure,
            totals,
            averages,
            alerts,
        })
    }
}
