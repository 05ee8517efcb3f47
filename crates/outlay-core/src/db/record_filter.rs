//! Record filter builder for constructing WHERE clauses
//!
//! Shared by the listing, counting and aggregate queries so they all agree
//! on scoping: owner, optional calendar month, and soft-delete exclusion.

use crate::models::RecordCriteria;

/// Builder for record query filters
#[derive(Default)]
pub struct RecordFilter {
    pub owner_id: Option<i64>,
    pub month: Option<(i32, u32)>,
    pub include_deleted: bool,
}

/// SQL components and parameters produced by [`RecordFilter::build`]
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner_id(mut self, id: i64) -> Self {
        self.owner_id = Some(id);
        self
    }

    /// Exact calendar month (year, month)
    pub fn month(mut self, month: Option<(i32, u32)>) -> Self {
        self.month = month;
        self
    }

    pub fn include_deleted(mut self, value: bool) -> Self {
        self.include_deleted = value;
        self
    }

    pub fn build(self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if !self.include_deleted {
            conditions.push("deleted_at IS NULL".to_string());
        }

        if let Some(owner_id) = self.owner_id {
            conditions.push("owner_id = ?".to_string());
            params.push(Box::new(owner_id));
        }

        // strftime yields zero-padded text, so compare against formatted strings
        if let Some((year, month)) = self.month {
            conditions.push("strftime('%Y', date) = ? AND strftime('%m', date) = ?".to_string());
            params.push(Box::new(format!("{:04}", year)));
            params.push(Box::new(format!("{:02}", month)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        FilterResult {
            where_clause,
            params,
        }
    }
}

impl From<&RecordCriteria> for RecordFilter {
    fn from(criteria: &RecordCriteria) -> Self {
        Self::new()
            .owner_id(criteria.owner_id)
            .month(criteria.month)
    }
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }

    /// Take the parameters to append pagination params
    pub fn into_params(self) -> Vec<Box<dyn rusqlite::ToSql>> {
        self.params
    }
}
