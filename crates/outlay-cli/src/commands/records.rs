//! Record commands (list, add, edit, delete)

use anyhow::{Context, Result};
use outlay_core::{Database, RecordPage, RecordService};

use super::{now, parse_date_arg, truncate};

pub fn cmd_list(
    db: &Database,
    owner_id: i64,
    (year, month): (i32, u32),
    page: i64,
    page_size: i64,
) -> Result<RecordPage> {
    let listing = RecordService::new(db).list(owner_id, year, month, page, page_size)?;

    if listing.items.is_empty() {
        println!("No records for {}-{:02}.", year, month);
        return Ok(listing);
    }

    println!(
        "{:>6}  {:19}  {:>10}  {:<14}  Description",
        "ID", "Date", "Amount", "Category"
    );
    for record in &listing.items {
        println!(
            "{:>6}  {:19}  {:>10.2}  {:<14}  {}",
            record.id.unwrap_or_default(),
            record.date.format("%Y-%m-%d %H:%M:%S"),
            record.amount(),
            truncate(&record.category, 14),
            truncate(&record.description, 40)
        );
    }
    println!();
    println!(
        "Page {} of {} ({} records)",
        listing.page, listing.total_pages, listing.total
    );

    Ok(listing)
}

pub fn cmd_add(
    db: &Database,
    owner_id: i64,
    amount: f64,
    description: &str,
    date: Option<&str>,
    category: &str,
) -> Result<i64> {
    let now = now();
    let date = date.map(parse_date_arg).transpose()?.unwrap_or(now);

    let record = RecordService::new(db)
        .create(owner_id, amount, description, date, category, now)
        .context("Failed to add record")?;
    let id = record.id.context("Record was not assigned an id")?;

    println!("✅ Added record {} ({:.2} € {})", id, record.amount(), record.category);
    Ok(id)
}

pub fn cmd_edit(
    db: &Database,
    owner_id: i64,
    id: i64,
    amount: f64,
    description: &str,
    date: &str,
    category: &str,
) -> Result<()> {
    let date = parse_date_arg(date)?;

    RecordService::new(db)
        .update(owner_id, id, amount, description, date, category, now())
        .with_context(|| format!("Failed to update record {}", id))?;

    println!("✅ Updated record {}", id);
    Ok(())
}

pub fn cmd_delete(db: &Database, owner_id: i64, id: i64) -> Result<()> {
    RecordService::new(db)
        .delete(owner_id, id)
        .with_context(|| format!("Failed to delete record {}", id))?;

    println!("🗑️  Deleted record {}", id);
    Ok(())
}
