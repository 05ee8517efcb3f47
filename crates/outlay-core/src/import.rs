//! Bulk CSV import of financial records
//!
//! Rows are `date,amount,description,category` with no header; extra fields
//! are ignored. Bad rows are skipped with a reason, never fatal. The import
//! as a whole is atomic: a store failure rolls back every row of the call.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use tracing::{debug, info, warn};

use crate::catalog::CategoryCatalog;
use crate::error::Result;
use crate::models::{FinancialRecord, ImportOutcome, RecordCriteria, SkipReason, SkippedRow};
use crate::store::{RecordStore, TransactionalStore};

/// Existing records fetched per row for duplicate detection
pub const DEDUP_WINDOW: i64 = 1000;

/// Minimum fields per row: date, amount, description, category
const REQUIRED_FIELDS: usize = 4;

/// Import CSV rows for an owner, returning how many were committed
pub fn import_csv<S, R>(
    store: &S,
    catalog: &CategoryCatalog,
    owner_id: i64,
    reader: R,
) -> Result<usize>
where
    S: TransactionalStore,
    R: Read,
{
    let now = Local::now().naive_local();
    import_csv_detailed(store, catalog, owner_id, reader, now).map(|outcome| outcome.imported)
}

/// Import CSV rows and report every skipped row
///
/// `now` bounds the accepted dates (records may not be in the future).
pub fn import_csv_detailed<S, R>(
    store: &S,
    catalog: &CategoryCatalog,
    owner_id: i64,
    reader: R,
    now: NaiveDateTime,
) -> Result<ImportOutcome>
where
    S: TransactionalStore,
    R: Read,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let outcome = store.transaction(|tx| {
        let mut outcome = ImportOutcome::default();

        for result in rdr.records() {
            let row = match result {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    outcome.skipped.push(SkippedRow {
                        line,
                        reason: SkipReason::Malformed(e.to_string()),
                    });
                    continue;
                }
            };
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let mut record = match parse_row(&row, catalog, owner_id, now) {
                Ok(record) => record,
                Err(reason) => {
                    debug!("Skipping line {}: {}", line, reason);
                    outcome.skipped.push(SkippedRow { line, reason });
                    continue;
                }
            };

            if is_duplicate(tx, &record)? {
                debug!("Skipping line {}: duplicate entry", line);
                outcome.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::Duplicate,
                });
                continue;
            }

            tx.save(&mut record)?;
            outcome.imported += 1;
        }

        Ok(outcome)
    })?;

    if !outcome.skipped.is_empty() {
        warn!(
            "Import skipped {} row(s): {}",
            outcome.skipped.len(),
            outcome.skip_summary()
        );
    }
    info!(
        "Imported {} record(s) for owner {} ({} skipped)",
        outcome.imported,
        owner_id,
        outcome.skipped.len()
    );

    Ok(outcome)
}

/// Turn one CSV row into an unsaved record, or the reason it is rejected
fn parse_row(
    row: &StringRecord,
    catalog: &CategoryCatalog,
    owner_id: i64,
    now: NaiveDateTime,
) -> std::result::Result<FinancialRecord, SkipReason> {
    if row.len() < REQUIRED_FIELDS {
        return Err(SkipReason::InsufficientColumns);
    }

    let date_str = &row[0];
    let amount_str = &row[1];
    let description = &row[2];
    let category = row[3].to_lowercase();

    if !catalog.contains(&category) {
        return Err(SkipReason::UnknownCategory);
    }

    let date = parse_date(date_str).map_err(SkipReason::InvalidDate)?;
    let amount = parse_amount(amount_str).map_err(SkipReason::InvalidAmount)?;

    let record = FinancialRecord::new(owner_id, date, category, amount, description);
    record.validate(now).map_err(SkipReason::Invalid)?;

    Ok(record)
}

/// Whether an identical record already exists in the candidate's month
fn is_duplicate(store: &dyn RecordStore, candidate: &FinancialRecord) -> Result<bool> {
    let (year, month) = candidate.year_month();
    let existing = store.find_by(
        &RecordCriteria::month(candidate.owner_id, year, month),
        0,
        DEDUP_WINDOW,
    )?;
    Ok(existing.iter().any(|r| r.is_duplicate_of(candidate)))
}

/// Parse a date or datetime field; date-only values land on midnight
///
/// Accepts RFC 3339, `YYYY-MM-DD[ HH:MM[:SS]]`, `YYYY-MM-DDTHH:MM:SS`,
/// `MM/DD/YYYY` and `DD.MM.YYYY`.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDateTime, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S", // 2024-01-15 14:30:00
        "%Y-%m-%dT%H:%M:%S", // 2024-01-15T14:30:00
        "%Y-%m-%d %H:%M",    // 2024-01-15 14:30
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let date_formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%d.%m.%Y", // 15.01.2024
    ];
    for fmt in date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    Err(format!("Unable to parse date: {}", s))
}

/// Parse an amount string, stripping currency symbols and spaces
fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned = s.trim().replace(['€', '$', ' '], "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Unable to parse amount: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::error::{Error, ValidationError};
    use std::sync::{Arc, Mutex};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap()
    }

    fn setup() -> (Database, CategoryCatalog) {
        (
            Database::in_memory().unwrap(),
            CategoryCatalog::embedded().unwrap(),
        )
    }

    fn run(db: &Database, catalog: &CategoryCatalog, csv: &str) -> ImportOutcome {
        import_csv_detailed(db, catalog, 1, csv.as_bytes(), now()).unwrap()
    }

    #[test]
    fn test_parse_date() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), midnight);
        assert_eq!(parse_date("01/15/2024").unwrap(), midnight);
        assert_eq!(parse_date("15.01.2024").unwrap(), midnight);

        let afternoon = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(parse_date("2024-01-15 14:30:00").unwrap(), afternoon);
        assert_eq!(parse_date("2024-01-15T14:30:00").unwrap(), afternoon);
        assert_eq!(parse_date("2024-01-15 14:30").unwrap(), afternoon);
        assert_eq!(parse_date("2024-01-15T14:30:00+02:00").unwrap(), afternoon);

        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("2024-13-45").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50").unwrap(), 12.5);
        assert_eq!(parse_amount("€ 12.50").unwrap(), 12.5);
        assert_eq!(parse_amount("$99.99").unwrap(), 99.99);
        assert_eq!(parse_amount("-3").unwrap(), -3.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_import_valid_rows() {
        let (db, catalog) = setup();
        let csv = "2025-03-01,12.50,Milk,groceries\n2025-03-02 08:15:00,40,Bus pass,Transport,extra,fields\n";

        let outcome = run(&db, &catalog, csv);
        assert_eq!(outcome.imported, 2);
        assert!(outcome.skipped.is_empty());

        let records = db.find_by(&RecordCriteria::month(1, 2025, 3), 0, 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "transport");
        assert_eq!(records[0].amount_cents, 4000);
        assert_eq!(records[1].description, "Milk");
        assert_eq!(records[1].amount_cents, 1250);
    }

    #[test]
    fn test_skip_reasons_and_lines() {
        let (db, catalog) = setup();
        let csv = "\
2025-03-01,10,Milk\n\
2025-03-01,10,Milk,pets\n\
not-a-date,10,Milk,groceries\n\
2025-03-01,ten,Milk,groceries\n\
2025-03-01,0,Milk,groceries\n\
2025-03-01,5,,groceries\n\
2025-07-15,5,Later,groceries\n\
2025-03-01,5,Bread,groceries\n";

        let outcome = run(&db, &catalog, csv);
        assert_eq!(outcome.imported, 1);

        let reasons: Vec<(u64, SkipReason)> = outcome
            .skipped
            .iter()
            .map(|s| (s.line, s.reason.clone()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (1, SkipReason::InsufficientColumns),
                (2, SkipReason::UnknownCategory),
                (3, SkipReason::InvalidDate("Unable to parse date: not-a-date".into())),
                (4, SkipReason::InvalidAmount("Unable to parse amount: ten".into())),
                (5, SkipReason::Invalid(ValidationError::NonPositiveAmount)),
                (6, SkipReason::Invalid(ValidationError::EmptyDescription)),
                (7, SkipReason::Invalid(ValidationError::FutureDate)),
            ]
        );
        assert!(outcome
            .skip_summary()
            .starts_with("line 1: insufficient columns; line 2: unknown category; "));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let (db, catalog) = setup();
        let outcome = run(&db, &catalog, "\n2025-03-01,10,Milk,groceries\n\n\n");
        assert_eq!(outcome.imported, 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let (db, catalog) = setup();
        let csv = "2025-03-01,10,Milk,groceries\n2025-03-05,20,Fuel,transport\n";

        assert_eq!(import_csv(&db, &catalog, 1, csv.as_bytes()).unwrap(), 2);
        let second = run(&db, &catalog, csv);
        assert_eq!(second.imported, 0);
        assert!(second
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::Duplicate));
        assert_eq!(db.count_by(&RecordCriteria::owner(1)).unwrap(), 2);
    }

    #[test]
    fn test_reimport_with_fractional_seconds() {
        let (db, catalog) = setup();
        let csv = "2025-03-01T10:00:00.500Z,10,Milk,groceries\n";

        assert_eq!(run(&db, &catalog, csv).imported, 1);
        let second = run(&db, &catalog, csv);
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped[0].reason, SkipReason::Duplicate);
    }

    #[test]
    fn test_duplicate_search_bounded_by_window() {
        let (db, catalog) = setup();
        let old = "2025-03-01,10,Milk,groceries\n";
        assert_eq!(run(&db, &catalog, old).imported, 1);

        let newer = NaiveDate::from_ymd_opt(2025, 3, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let seed = |count: i64| {
            db.transaction(|tx| {
                for i in 0..count {
                    let mut record =
                        FinancialRecord::new(1, newer, "other", 1.0, format!("Filler {}", i));
                    tx.save(&mut record)?;
                }
                Ok(())
            })
            .unwrap();
        };

        // The old entry is still among the newest DEDUP_WINDOW records
        seed(DEDUP_WINDOW - 1);
        assert_eq!(run(&db, &catalog, old).imported, 0);

        // One more newer record pushes it out of the window
        seed(1);
        assert_eq!(run(&db, &catalog, old).imported, 1);
        assert_eq!(
            db.count_by(&RecordCriteria::month(1, 2025, 3)).unwrap(),
            DEDUP_WINDOW + 2
        );
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skips_logged_as_single_warning() {
        let (db, catalog) = setup();
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .finish();

        let csv = "2025-03-01,10,Milk\n2025-03-01,10,Milk,pets\n2025-03-02,5,Bread,groceries\n";
        let outcome = tracing::subscriber::with_default(subscriber, || run(&db, &catalog, csv));
        assert_eq!(outcome.imported, 1);

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("WARN"));
        assert!(lines[0].ends_with(
            "Import skipped 2 row(s): line 1: insufficient columns; line 2: unknown category"
        ));
    }

    #[test]
    fn test_duplicates_within_one_payload() {
        let (db, catalog) = setup();
        let csv = "2025-03-01,10,Milk,groceries\n2025-03-01,10.00,Milk,GROCERIES\n";

        let outcome = run(&db, &catalog, csv);
        assert_eq!(outcome.imported, 1);
        assert_eq!(
            outcome.skipped,
            vec![SkippedRow {
                line: 2,
                reason: SkipReason::Duplicate
            }]
        );
    }

    #[test]
    fn test_duplicate_check_scoped_to_owner() {
        let (db, catalog) = setup();
        let csv = "2025-03-01,10,Milk,groceries\n";

        assert_eq!(import_csv(&db, &catalog, 1, csv.as_bytes()).unwrap(), 1);
        assert_eq!(import_csv(&db, &catalog, 2, csv.as_bytes()).unwrap(), 1);
    }

    #[test]
    fn test_store_failure_rolls_back_whole_import() {
        let (db, catalog) = setup();
        db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_insert BEFORE INSERT ON records
                 WHEN NEW.description = 'explode'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )
            .unwrap();

        let csv = "2025-03-01,10,Milk,groceries\n2025-03-02,10,explode,groceries\n2025-03-03,10,Eggs,groceries\n";
        let result = import_csv_detailed(&db, &catalog, 1, csv.as_bytes(), now());

        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(db.count_by(&RecordCriteria::month(1, 2025, 3)).unwrap(), 0);
    }

    #[test]
    fn test_empty_payload() {
        let (db, catalog) = setup();
        let outcome = run(&db, &catalog, "");
        assert_eq!(outcome.imported, 0);
        assert!(outcome.skipped.is_empty());
    }
}
