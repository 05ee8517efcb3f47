//! CSV import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use outlay_core::{import_csv_detailed, CategoryCatalog, Database, ImportOutcome};

use super::now;

pub fn cmd_import(
    db: &Database,
    catalog: &CategoryCatalog,
    owner_id: i64,
    file: &Path,
) -> Result<ImportOutcome> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing records from {}...", file.display());

    let outcome = import_csv_detailed(db, catalog, owner_id, csv_file, now())
        .context("Import failed; no records were saved")?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", outcome.imported);
    println!("   Skipped:  {}", outcome.skipped.len());

    for skipped in &outcome.skipped {
        println!("     line {}: {}", skipped.line, skipped.reason);
    }

    Ok(outcome)
}
