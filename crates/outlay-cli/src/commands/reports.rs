//! Report command implementations

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use outlay_core::{
    Alert, AlertGenerator, AlertKind, CategoryCatalog, Database, MonthlyReport, RecordService,
};

use super::bar;

pub fn cmd_report(
    db: &Database,
    catalog: &CategoryCatalog,
    owner_id: i64,
    (year, month): (i32, u32),
    today: NaiveDate,
    json: bool,
) -> Result<MonthlyReport> {
    let report = MonthlyReport::build(db, catalog, owner_id, year, month, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    println!();
    println!("📊 Spending Report: {}-{:02}", year, month);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: {:.2} €", report.total_expenditure);

    if report.totals.is_empty() {
        println!();
        println!("   No records for this month.");
    } else {
        println!();
        println!("   By category (share of total):");
        for (category, agg) in &report.totals {
            println!(
                "   {:<16} {:>10.2} € {:>6.1}% {}",
                catalog.label_for(category),
                agg.value,
                agg.percentage,
                bar(agg.percentage)
            );
        }

        println!();
        println!("   Average per record (relative to highest):");
        for (category, agg) in &report.averages {
            println!(
                "   {:<16} {:>10.2} € {:>6.1}% {}",
                catalog.label_for(category),
                agg.value,
                agg.percentage,
                bar(agg.percentage)
            );
        }
    }

    if !report.alerts.is_empty() {
        println!();
        print_alerts(&report.alerts);
    }

    Ok(report)
}

/// Budget alerts for the current calendar month
pub fn cmd_alerts(
    db: &Database,
    catalog: &CategoryCatalog,
    owner_id: i64,
    today: NaiveDate,
) -> Result<Vec<Alert>> {
    let (year, month) = (today.year(), today.month());
    let alerts = AlertGenerator::new(db, catalog).generate(owner_id, year, month)?;

    println!();
    println!("🔔 Budget alerts: {}-{:02}", year, month);
    println!("   ─────────────────────────────────────────────────────────────");
    print_alerts(&alerts);

    Ok(alerts)
}

fn print_alerts(alerts: &[Alert]) {
    for alert in alerts {
        let icon = match alert.kind {
            AlertKind::Warning => "⚠️ ",
            AlertKind::Success => "✅",
        };
        println!("   {} {}", icon, alert.message);
    }
}

pub fn cmd_years(db: &Database, owner_id: i64, today: NaiveDate) -> Result<Vec<i32>> {
    let years = RecordService::new(db).available_years(owner_id, today)?;
    for year in &years {
        println!("{}", year);
    }
    Ok(years)
}

pub fn cmd_categories(catalog: &CategoryCatalog) -> Result<()> {
    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for entry in catalog.entries() {
        match entry.budget {
            Some(budget) => println!("   {:<16} {:<16} {:>10.2} €", entry.key, entry.label, budget),
            None => println!("   {:<16} {:<16} {:>12}", entry.key, entry.label, "no budget"),
        }
    }
    Ok(())
}
