//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `load_catalog` - Shared setup used by every command
//! - `resolve_month` / `parse_date_arg` - Argument helpers
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use outlay_core::{parse_date, CategoryCatalog, Database};

/// Open (or create) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Load the category catalog from an explicit path or the default chain
pub fn load_catalog(path: Option<&Path>) -> Result<CategoryCatalog> {
    CategoryCatalog::load(path).context("Failed to load category catalog")
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Fill in missing year/month from `today`
pub fn resolve_month(year: Option<i32>, month: Option<u32>, today: NaiveDate) -> Result<(i32, u32)> {
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        bail!("Invalid month {} (use 1-12)", month);
    }
    Ok((year, month))
}

/// Parse a --date argument with the importer's date formats
pub fn parse_date_arg(s: &str) -> Result<NaiveDateTime> {
    parse_date(s).map_err(|e| anyhow!("{} (use YYYY-MM-DD or YYYY-MM-DD HH:MM[:SS])", e))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import records: outlay import --file expenses.csv");
    println!("  2. View this month: outlay report");

    Ok(())
}
