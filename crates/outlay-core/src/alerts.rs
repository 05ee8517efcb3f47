//! Budget alerts for one owner's month
//!
//! Budgets are checked in catalog order. Categories that have spend but no
//! budget never produce an alert. When nothing is over budget the result is
//! a single success alert; warnings and the success alert are never mixed.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::models::Alert;
use crate::store::RecordStore;
use crate::summary::MonthlySummary;

pub const WITHIN_BUDGET_MESSAGE: &str = "Looking good! You are within budget for this month.";

/// Generates budget alerts from a store and the category catalog
pub struct AlertGenerator<'a, S: RecordStore + ?Sized> {
    summary: MonthlySummary<'a, S>,
    catalog: &'a CategoryCatalog,
}

impl<'a, S: RecordStore + ?Sized> AlertGenerator<'a, S> {
    pub fn new(store: &'a S, catalog: &'a CategoryCatalog) -> Self {
        Self {
            summary: MonthlySummary::new(store),
            catalog,
        }
    }

    /// Alerts for the given month. Callers decide which month is worth asking about.
    pub fn generate(&self, owner_id: i64, year: i32, month: u32) -> Result<Vec<Alert>> {
        let totals: BTreeMap<String, f64> = self
            .summary
            .compute_per_category_totals(owner_id, year, month)?
            .into_iter()
            .map(|(category, agg)| (category, agg.value))
            .collect();

        let alerts = evaluate_budgets(&totals, &self.catalog.budgets());
        debug!(
            "Generated {} alert(s) for owner {} {}-{:02}",
            alerts.len(),
            owner_id,
            year,
            month
        );
        Ok(alerts)
    }
}

/// Compare per-category spend against ordered budgets
pub fn evaluate_budgets(totals: &BTreeMap<String, f64>, budgets: &[(&str, f64)]) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = budgets
        .iter()
        .filter_map(|(category, budget)| {
            let spend = totals.get(*category).copied().unwrap_or(0.0);
            (spend > *budget).then(|| {
                Alert::warning(format!(
                    "{} budget exceeded by {:.2} €",
                    category,
                    spend - budget
                ))
            })
        })
        .collect();

    if alerts.is_empty() {
        alerts.push(Alert::success(WITHIN_BUDGET_MESSAGE));
    }
    alerts
}
