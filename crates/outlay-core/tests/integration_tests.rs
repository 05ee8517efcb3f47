//! Integration tests for outlay-core
//!
//! These tests exercise the full import → aggregate → alert workflow.

use std::io::Write;

use chrono::{Datelike, Local, NaiveDate};
use outlay_core::{
    import_csv, import_csv_detailed, AlertKind, CategoryCatalog, Database, MonthlyReport,
    RecordCriteria, RecordService, RecordStore, SkipReason,
};

/// One month of spending: groceries over budget, everything else within
fn march_csv() -> &'static str {
    "2025-03-02,120.00,Supermarket,groceries
2025-03-09,95.50,Supermarket,groceries
2025-03-16,110.25,Farmers market,groceries
2025-03-05,64.00,Electricity,utilities
2025-03-10,49.99,Monthly pass,transport
2025-03-20,35.00,Cinema,entertainment
2025-03-21,12.00,Gift wrap,gifts
bad line"
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 28).unwrap()
}

// =============================================================================
// Import Workflow Tests
// =============================================================================

#[test]
fn test_full_import_report_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let catalog = CategoryCatalog::embedded().expect("Failed to load catalog");
    let now = today().and_hms_opt(12, 0, 0).unwrap();

    let outcome = import_csv_detailed(&db, &catalog, 1, march_csv().as_bytes(), now)
        .expect("Import failed");

    assert_eq!(outcome.imported, 6);
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].line, 7);
    assert_eq!(outcome.skipped[0].reason, SkipReason::UnknownCategory);
    assert_eq!(outcome.skipped[1].reason, SkipReason::InsufficientColumns);

    let report = MonthlyReport::build(&db, &catalog, 1, 2025, 3, today()).expect("Report failed");

    assert!((report.total_expenditure - 474.74).abs() < 1e-9);
    assert!((report.totals["groceries"].value - 325.75).abs() < 1e-9);

    let percentage_sum: f64 = report.totals.values().map(|v| v.percentage).sum();
    assert!((percentage_sum - 100.0).abs() < 0.01);

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind, AlertKind::Warning);
    assert_eq!(
        report.alerts[0].message,
        "groceries budget exceeded by 25.75 €"
    );
}

#[test]
fn test_import_from_file_twice() {
    let db = Database::in_memory().unwrap();
    let catalog = CategoryCatalog::embedded().unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "2024-11-02,10.00,Bakery,groceries\n2024-11-03,20.00,Taxi,transport\n"
    )
    .unwrap();

    let first = import_csv(&db, &catalog, 1, std::fs::File::open(file.path()).unwrap()).unwrap();
    let second = import_csv(&db, &catalog, 1, std::fs::File::open(file.path()).unwrap()).unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(db.count_by(&RecordCriteria::month(1, 2024, 11)).unwrap(), 2);
}

#[test]
fn test_failed_import_leaves_month_unchanged() {
    let db = Database::in_memory().unwrap();
    let catalog = CategoryCatalog::embedded().unwrap();

    import_csv(&db, &catalog, 1, "2024-11-01,5,Existing,other\n".as_bytes()).unwrap();
    db.conn()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER fail_insert BEFORE INSERT ON records
             WHEN NEW.description = 'explode'
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    let csv = "2024-11-02,10,Bakery,groceries\n2024-11-03,10,explode,groceries\n";
    let result = import_csv(&db, &catalog, 1, csv.as_bytes());

    assert!(result.is_err());
    assert_eq!(db.count_by(&RecordCriteria::month(1, 2024, 11)).unwrap(), 1);
}

// =============================================================================
// Record Service Tests
// =============================================================================

#[test]
fn test_manual_records_feed_current_month_report() {
    let db = Database::in_memory().unwrap();
    let catalog = CategoryCatalog::embedded().unwrap();
    let service = RecordService::new(&db);

    let now = Local::now().naive_local();
    let today = now.date();

    let record = service
        .create(1, 42.0, "Groceries run", now, "groceries", now)
        .unwrap();

    let report =
        MonthlyReport::build(&db, &catalog, 1, today.year(), today.month(), today).unwrap();
    assert_eq!(report.total_expenditure, 42.0);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind, AlertKind::Success);

    service.delete(1, record.id.unwrap()).unwrap();
    let report =
        MonthlyReport::build(&db, &catalog, 1, today.year(), today.month(), today).unwrap();
    assert_eq!(report.total_expenditure, 0.0);
}

#[test]
fn test_owners_are_isolated() {
    let db = Database::in_memory().unwrap();
    let catalog = CategoryCatalog::embedded().unwrap();
    let now = today().and_hms_opt(12, 0, 0).unwrap();

    import_csv_detailed(&db, &catalog, 1, march_csv().as_bytes(), now).unwrap();

    let report = MonthlyReport::build(&db, &catalog, 2, 2025, 3, today()).unwrap();
    assert_eq!(report.total_expenditure, 0.0);
    assert!(report.totals.is_empty());
    assert_eq!(report.alerts[0].kind, AlertKind::Success);
}
