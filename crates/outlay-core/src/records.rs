//! Single-record operations with explicit owner checks
//!
//! Category membership is not checked here; only the bulk importer rejects
//! categories outside the catalog.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{FinancialRecord, RecordCriteria, RecordPage};
use crate::store::RecordStore;

/// Create, edit, delete and page through one owner's records
pub struct RecordService<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> RecordService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and store a new record
    pub fn create(
        &self,
        owner_id: i64,
        amount: f64,
        description: &str,
        date: NaiveDateTime,
        category: &str,
        now: NaiveDateTime,
    ) -> Result<FinancialRecord> {
        let mut record = FinancialRecord::new(owner_id, date, category, amount, description);
        record.validate(now)?;
        self.store.save(&mut record)?;
        info!(
            "Created record {:?} for owner {} in {}",
            record.id, owner_id, record.category
        );
        Ok(record)
    }

    /// Replace amount, description, date and category of an owned record
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &self,
        owner_id: i64,
        id: i64,
        amount: f64,
        description: &str,
        date: NaiveDateTime,
        category: &str,
        now: NaiveDateTime,
    ) -> Result<FinancialRecord> {
        let existing = self.get(owner_id, id)?;

        let mut record = FinancialRecord::new(owner_id, date, category, amount, description);
        record.id = existing.id;
        record.validate(now)?;
        self.store.save(&mut record)?;
        debug!("Updated record {} for owner {}", id, owner_id);
        Ok(record)
    }

    /// An owned, live record
    pub fn get(&self, owner_id: i64, id: i64) -> Result<FinancialRecord> {
        self.store
            .find(id)?
            .filter(|r| r.owner_id == owner_id)
            .ok_or(Error::NotFoundOrForbidden(id))
    }

    /// Soft delete an owned record
    pub fn delete(&self, owner_id: i64, id: i64) -> Result<()> {
        self.get(owner_id, id)?;
        self.store.delete(id)?;
        info!("Deleted record {} for owner {}", id, owner_id);
        Ok(())
    }

    /// One page (1-based) of a month's records, newest first
    pub fn list(
        &self,
        owner_id: i64,
        year: i32,
        month: u32,
        page: i64,
        page_size: i64,
    ) -> Result<RecordPage> {
        if page_size <= 0 {
            return Err(Error::InvalidData(format!(
                "Page size must be positive, got {}",
                page_size
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month: {}", month)));
        }
        let page = page.max(1);
        let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
            Error::InvalidData(format!(
                "Page {} of size {} is out of range",
                page, page_size
            ))
        })?;

        let criteria = RecordCriteria::month(owner_id, year, month);
        let total = self.store.count_by(&criteria)?;
        let items = self.store.find_by(&criteria, offset, page_size)?;

        Ok(RecordPage {
            items,
            total,
            page,
            page_size,
            total_pages: total / page_size + i64::from(total % page_size != 0),
        })
    }

    /// Years with records plus the current year, newest first
    pub fn available_years(&self, owner_id: i64, today: NaiveDate) -> Result<Vec<i32>> {
        let mut years = self.store.list_years(owner_id)?;
        if !years.contains(&today.year()) {
            years.push(today.year());
        }
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }
}
