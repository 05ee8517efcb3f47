//! Monthly aggregation: total expenditure and per-category figures
//!
//! Totals and averages are normalized differently. A category total's
//! percentage is its share of the month's grand total, so the percentages
//! add up to 100. A category average's percentage is relative to the largest
//! average, so the top category always reads 100.

use tracing::debug;

use crate::error::Result;
use crate::models::{AggregatedValue, CategoryAggregates, RecordCriteria};
use crate::store::RecordStore;

/// Aggregates one owner's month from a record store
pub struct MonthlySummary<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> MonthlySummary<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Sum of the month's amounts, 0.0 when there are none
    pub fn compute_total_expenditure(&self, owner_id: i64, year: i32, month: u32) -> Result<f64> {
        self.store
            .sum_amounts(&RecordCriteria::month(owner_id, year, month))
    }

    /// Per-category sums with their share of the grand total
    pub fn compute_per_category_totals(
        &self,
        owner_id: i64,
        year: i32,
        month: u32,
    ) -> Result<CategoryAggregates> {
        let sums = self
            .store
            .sum_amounts_by_category(&RecordCriteria::month(owner_id, year, month))?;
        let totals = normalize_by_sum(sums);
        debug!(
            "Category totals for owner {} {}-{:02}: {} categories",
            owner_id,
            year,
            month,
            totals.len()
        );
        Ok(totals)
    }

    /// Per-category averages relative to the largest average
    pub fn compute_per_category_averages(
        &self,
        owner_id: i64,
        year: i32,
        month: u32,
    ) -> Result<CategoryAggregates> {
        let averages = self
            .store
            .average_amounts_by_category(&RecordCriteria::month(owner_id, year, month))?;
        Ok(normalize_by_max(averages))
    }
}

/// percentage = value / sum * 100 (all zero when the sum is zero)
pub fn normalize_by_sum(values: Vec<(String, f64)>) -> CategoryAggregates {
    let grand_total: f64 = values.iter().map(|(_, v)| v).sum();
    values
        .into_iter()
        .map(|(category, value)| {
            let percentage = if grand_total > 0.0 {
                value / grand_total * 100.0
            } else {
                0.0
            };
            (category, AggregatedValue { value, percentage })
        })
        .collect()
}

/// percentage = value / max * 100 (all zero when the max is zero)
pub fn normalize_by_max(values: Vec<(String, f64)>) -> CategoryAggregates {
    let max = values.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    values
        .into_iter()
        .map(|(category, value)| {
            let percentage = if max > 0.0 { value / max * 100.0 } else { 0.0 };
            (category, AggregatedValue { value, percentage })
        })
        .collect()
}
