//! Record store contract
//!
//! Every query is owner-scoped through [`RecordCriteria`] and never returns
//! soft-deleted rows. Amounts leave the store in major units; the minor-unit
//! (cents) representation stays behind this boundary.

use crate::error::Result;
use crate::models::{FinancialRecord, RecordCriteria};

/// Persistence operations on financial records
pub trait RecordStore {
    /// Look up a live record by id
    fn find(&self, id: i64) -> Result<Option<FinancialRecord>>;

    /// Insert when `record.id` is `None` (the new id is written back),
    /// otherwise replace the row matching both `id` and `owner_id`
    fn save(&self, record: &mut FinancialRecord) -> Result<()>;

    /// Soft delete
    fn delete(&self, id: i64) -> Result<()>;

    /// Matching records, newest first
    fn find_by(
        &self,
        criteria: &RecordCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FinancialRecord>>;

    fn count_by(&self, criteria: &RecordCriteria) -> Result<i64>;

    /// Distinct calendar years with records, descending
    fn list_years(&self, owner_id: i64) -> Result<Vec<i32>>;

    /// Sum of amounts; 0.0 when nothing matches
    fn sum_amounts(&self, criteria: &RecordCriteria) -> Result<f64>;

    fn sum_amounts_by_category(&self, criteria: &RecordCriteria) -> Result<Vec<(String, f64)>>;

    fn average_amounts_by_category(
        &self,
        criteria: &RecordCriteria,
    ) -> Result<Vec<(String, f64)>>;
}

/// A store that can run a unit of work atomically
pub trait TransactionalStore: RecordStore {
    /// Run `f` against a view bound to one transaction.
    ///
    /// `Ok` commits. `Err` rolls back every write made through the view and
    /// is returned unchanged.
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn RecordStore) -> Result<T>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn find(&self, id: i64) -> Result<Option<FinancialRecord>> {
        (**self).find(id)
    }

    fn save(&self, record: &mut FinancialRecord) -> Result<()> {
        (**self).save(record)
    }

    fn delete(&self, id: i64) -> Result<()> {
        (**self).delete(id)
    }

    fn find_by(
        &self,
        criteria: &RecordCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FinancialRecord>> {
        (**self).find_by(criteria, offset, limit)
    }

    fn count_by(&self, criteria: &RecordCriteria) -> Result<i64> {
        (**self).count_by(criteria)
    }

    fn list_years(&self, owner_id: i64) -> Result<Vec<i32>> {
        (**self).list_years(owner_id)
    }

    fn sum_amounts(&self, criteria: &RecordCriteria) -> Result<f64> {
        (**self).sum_amounts(criteria)
    }

    fn sum_amounts_by_category(&self, criteria: &RecordCriteria) -> Result<Vec<(String, f64)>> {
        (**self).sum_amounts_by_category(criteria)
    }

    fn average_amounts_by_category(
        &self,
        criteria: &RecordCriteria,
    ) -> Result<Vec<(String, f64)>> {
        (**self).average_amounts_by_category(criteria)
    }
}
