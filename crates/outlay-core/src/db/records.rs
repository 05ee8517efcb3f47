//! Record queries
//!
//! [`SqliteRecords`] runs the queries against any borrowed connection, which
//! lets the same code serve a pooled connection and an open transaction
//! (`rusqlite::Transaction` derefs to `Connection`).

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{format_datetime, parse_datetime, Database, RecordFilter};
use crate::error::{Error, Result};
use crate::models::{FinancialRecord, RecordCriteria};
use crate::store::{RecordStore, TransactionalStore};

const RECORD_COLUMNS: &str = "id, owner_id, date, category, amount_cents, description, deleted_at";

/// Record queries over one borrowed connection
pub struct SqliteRecords<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteRecords<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub(crate) fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<FinancialRecord> {
        let date_str: String = row.get(2)?;
        let deleted_str: Option<String> = row.get(6)?;
        Ok(FinancialRecord {
            id: Some(row.get(0)?),
            owner_id: row.get(1)?,
            date: parse_datetime(&date_str)?,
            category: row.get(3)?,
            amount_cents: row.get(4)?,
            description: row.get(5)?,
            deleted_at: deleted_str.as_deref().map(parse_datetime).transpose()?,
        })
    }

    fn insert(&self, record: &mut FinancialRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO records (owner_id, date, category, amount_cents, description)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                record.owner_id,
                format_datetime(&record.date),
                record.category,
                record.amount_cents,
                record.description,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        record.id = Some(id);
        debug!("Inserted record {} for owner {}", id, record.owner_id);
        Ok(())
    }

    fn update(&self, id: i64, record: &FinancialRecord) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE records
            SET date = ?, category = ?, amount_cents = ?, description = ?
            WHERE id = ? AND owner_id = ? AND deleted_at IS NULL
            "#,
            params![
                format_datetime(&record.date),
                record.category,
                record.amount_cents,
                record.description,
                id,
                record.owner_id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFoundOrForbidden(id));
        }
        Ok(())
    }

    fn grouped(&self, aggregate: &str, criteria: &RecordCriteria) -> Result<Vec<(String, f64)>> {
        let filter = RecordFilter::from(criteria).build();
        let sql = format!(
            "SELECT category, {}(amount_cents) FROM records {} GROUP BY category ORDER BY category",
            aggregate, filter.where_clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(filter.params_refs().as_slice(), |row| {
                let category: String = row.get(0)?;
                let cents: f64 = row.get(1)?;
                Ok((category, cents / 100.0))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RecordStore for SqliteRecords<'_> {
    fn find(&self, id: i64) -> Result<Option<FinancialRecord>> {
        let sql = format!(
            "SELECT {} FROM records WHERE id = ? AND deleted_at IS NULL",
            RECORD_COLUMNS
        );
        let record = self
            .conn
            .query_row(&sql, params![id], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn save(&self, record: &mut FinancialRecord) -> Result<()> {
        match record.id {
            None => self.insert(record),
            Some(id) => self.update(id, record),
        }
    }

    fn delete(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE records SET deleted_at = strftime('%Y-%m-%d %H:%M:%S', 'now') WHERE id = ? AND deleted_at IS NULL",
            params![id],
        )?;
        if changed == 0 {
            return Err(Error::NotFoundOrForbidden(id));
        }
        debug!("Soft-deleted record {}", id);
        Ok(())
    }

    fn find_by(
        &self,
        criteria: &RecordCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FinancialRecord>> {
        let filter = RecordFilter::from(criteria).build();
        let sql = format!(
            "SELECT {} FROM records {} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
            RECORD_COLUMNS, filter.where_clause
        );

        let mut params = filter.into_params();
        params.push(Box::new(limit));
        params.push(Box::new(offset));
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(param_refs.as_slice(), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_by(&self, criteria: &RecordCriteria) -> Result<i64> {
        let filter = RecordFilter::from(criteria).build();
        let sql = format!("SELECT COUNT(*) FROM records {}", filter.where_clause);
        let count = self
            .conn
            .query_row(&sql, filter.params_refs().as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    fn list_years(&self, owner_id: i64) -> Result<Vec<i32>> {
        let filter = RecordFilter::new().owner_id(owner_id).build();
        let sql = format!(
            "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year FROM records {} ORDER BY year DESC",
            filter.where_clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let years = stmt
            .query_map(filter.params_refs().as_slice(), |row| row.get(0))?
            .collect::<std::result::Result<Vec<i32>, _>>()?;
        Ok(years)
    }

    fn sum_amounts(&self, criteria: &RecordCriteria) -> Result<f64> {
        let filter = RecordFilter::from(criteria).build();
        let sql = format!(
            "SELECT TOTAL(amount_cents) FROM records {}",
            filter.where_clause
        );
        let cents: f64 = self
            .conn
            .query_row(&sql, filter.params_refs().as_slice(), |row| row.get(0))?;
        Ok(cents / 100.0)
    }

    fn sum_amounts_by_category(&self, criteria: &RecordCriteria) -> Result<Vec<(String, f64)>> {
        self.grouped("TOTAL", criteria)
    }

    fn average_amounts_by_category(
        &self,
        criteria: &RecordCriteria,
    ) -> Result<Vec<(String, f64)>> {
        self.grouped("AVG", criteria)
    }
}

impl RecordStore for Database {
    fn find(&self, id: i64) -> Result<Option<FinancialRecord>> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).find(id)
    }

    fn save(&self, record: &mut FinancialRecord) -> Result<()> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).save(record)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).delete(id)
    }

    fn find_by(
        &self,
        criteria: &RecordCriteria,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<FinancialRecord>> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).find_by(criteria, offset, limit)
    }

    fn count_by(&self, criteria: &RecordCriteria) -> Result<i64> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).count_by(criteria)
    }

    fn list_years(&self, owner_id: i64) -> Result<Vec<i32>> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).list_years(owner_id)
    }

    fn sum_amounts(&self, criteria: &RecordCriteria) -> Result<f64> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).sum_amounts(criteria)
    }

    fn sum_amounts_by_category(&self, criteria: &RecordCriteria) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).sum_amounts_by_category(criteria)
    }

    fn average_amounts_by_category(
        &self,
        criteria: &RecordCriteria,
    ) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        SqliteRecords::new(&conn).average_amounts_by_category(criteria)
    }
}

impl TransactionalStore for Database {
    fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn RecordStore) -> Result<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Scope the view so its borrow of `tx` ends before commit/rollback
        let result = {
            let view = SqliteRecords::new(&tx);
            f(&view)
        };

        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}
