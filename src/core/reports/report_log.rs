// The report log: an append-only, one-worksheet-per-kind store sitting on
// top of whatever `WorksheetStore` the composition root hands us.

use super::clock::Clock;
use super::report_models::{LoggedRow, ReportKind, ReportRecord, DATE_FORMAT};
use super::worksheet_store::{StoreError, WorksheetStore};
use chrono::NaiveDateTime;
use dashmap::DashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Header names accepted for the timestamp column when reading rows back.
/// Older copies of the sheet used "Timestamp" instead of "Time".
pub const TIMESTAMP_ALIASES: [&str; 2] = ["Time", "Timestamp"];

#[derive(Debug, Error)]
pub enum ReportLogError {
    /// The backing document could not be reached at startup.
    #[error("Report storage is unavailable")]
    Unavailable,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub struct ReportLog<S: WorksheetStore> {
    store: Option<S>,
    clock: Arc<dyn Clock>,
    // Worksheets we've already seen or created, so appends skip the lookup.
    known_sheets: DashSet<&'static str>,
    // Held while a worksheet is checked and given its header row.
    sheet_setup: Mutex<()>,
}

impl<S: WorksheetStore> ReportLog<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Some(store),
            clock,
            known_sheets: DashSet::new(),
            sheet_setup: Mutex::new(()),
        }
    }

    /// A log whose backing store failed to connect. Every operation
    /// returns [`ReportLogError::Unavailable`].
    pub fn unavailable(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: None,
            clock,
            known_sheets: DashSet::new(),
            sheet_setup: Mutex::new(()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    #[cfg(test)]
    pub fn store_for_tests(&self) -> &S {
        self.store.as_ref().expect("report log has a store")
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Appends `record` to its kind's worksheet, creating the worksheet with
    /// its header row first if needed.
    pub async fn append(&self, record: &ReportRecord) -> Result<(), ReportLogError> {
        let store = self.store.as_ref().ok_or(ReportLogError::Unavailable)?;
        let kind = record.kind();
        let title = kind.sheet_title();

        self.ensure_worksheet(store, kind).await?;

        if let Err(err) = store.append_row(title, record.to_row()).await {
            // The sheet may have been deleted under us; look it up again next time.
            self.known_sheets.remove(title);
            return Err(err.into());
        }

        tracing::info!(sheet = title, "Report appended");
        Ok(())
    }

    /// Makes sure the worksheet exists and starts with its header row. A
    /// sheet left empty by an earlier failed header write gets it now.
    async fn ensure_worksheet(&self, store: &S, kind: ReportKind) -> Result<(), StoreError> {
        let title = kind.sheet_title();
        if self.known_sheets.contains(title) {
            return Ok(());
        }

        let _setup = self.sheet_setup.lock().await;
        if self.known_sheets.contains(title) {
            return Ok(());
        }

        let columns = kind.columns();
        if !store.worksheet_exists(title).await? {
            match store.add_worksheet(title, columns.len()).await {
                Ok(()) => tracing::info!(sheet = title, "Created worksheet"),
                // Someone else created it between our lookup and insert.
                Err(StoreError::AlreadyExists(_)) => {
                    tracing::debug!(sheet = title, "Worksheet appeared concurrently");
                }
                Err(err) => return Err(err),
            }
        }

        let has_header = store
            .read_rows(title)
            .await?
            .and_then(|rows| rows.into_iter().next())
            .map(|first| first.iter().any(|cell| !cell.trim().is_empty()))
            .unwrap_or(false);
        if !has_header {
            let header = columns.iter().map(|c| c.to_string()).collect();
            store.append_row(title, header).await?;
            tracing::info!(sheet = title, "Wrote header row");
        }

        self.known_sheets.insert(title);
        Ok(())
    }

    /// Rows of `kind` stamped with today's date, in storage order.
    pub async fn query_today(&self, kind: ReportKind) -> Result<Vec<LoggedRow>, ReportLogError> {
        let store = self.store.as_ref().ok_or(ReportLogError::Unavailable)?;
        let title = kind.sheet_title();

        let Some(rows) = store.read_rows(title).await? else {
            return Ok(Vec::new());
        };

        let today = self.clock.today().format(DATE_FORMAT).to_string();
        let matches = rows_for_date(&rows, &today);
        tracing::debug!(sheet = title, date = %today, count = matches.len(), "Queried today's rows");
        Ok(matches)
    }
}

/// Filters raw worksheet rows (header first) down to those whose timestamp
/// column starts with `date`. Rows without a recognised timestamp are skipped.
pub fn rows_for_date(rows: &[Vec<String>], date: &str) -> Vec<LoggedRow> {
    let Some((headers, body)) = rows.split_first() else {
        return Vec::new();
    };

    body.iter()
        .map(|values| LoggedRow::from_parts(headers, values))
        .filter(|row| {
            row.get_any(&TIMESTAMP_ALIASES)
                .map(|stamp| stamp.trim().starts_with(date))
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reports::FixedClock;
    use crate::infra::sheets::InMemoryWorksheetStore;

    fn log_at(day: u32) -> ReportLog<InMemoryWorksheetStore> {
        ReportLog::new(
            InMemoryWorksheetStore::new(),
            Arc::new(FixedClock::at(2026, 10, day, 9, 15)),
        )
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_append_creates_sheet_with_header_once() {
        let log = log_at(17);
        let now = log.now();

        log.append(&ReportRecord::cleaning(now, "Ana", "101", "Clean"))
            .await
            .unwrap();
        log.append(&ReportRecord::cleaning(now, "Ben", "102", "Dirty"))
            .await
            .unwrap();

        let rows = log.store.as_ref().unwrap().rows("Cleaning").unwrap();
        assert_eq!(
            rows,
            vec![
                row(&["Time", "Staff", "Room", "Status"]),
                row(&["2026-10-17 09:15", "Ana", "101", "Clean"]),
                row(&["2026-10-17 09:15", "Ben", "102", "Dirty"]),
            ]
        );
    }

    #[tokio::test]
    async fn test_append_reuses_sheet_created_elsewhere() {
        let store = InMemoryWorksheetStore::new();
        store.add_worksheet("Maintenance", 4).await.unwrap();
        store
            .append_row("Maintenance", row(&["Time", "Staff", "Issue", "Status"]))
            .await
            .unwrap();

        let log = ReportLog::new(store, Arc::new(FixedClock::at(2026, 10, 17, 9, 15)));
        log.append(&ReportRecord::maintenance(log.now(), "Ana", "Broken lamp"))
            .await
            .unwrap();

        let rows = log.store.as_ref().unwrap().rows("Maintenance").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][2], "Broken lamp");
    }

    #[tokio::test]
    async fn test_only_the_matching_sheet_is_written() {
        let log = log_at(17);
        log.append(&ReportRecord::task(log.now(), "Cy", "Morning Audit"))
            .await
            .unwrap();

        let store = log.store.as_ref().unwrap();
        assert_eq!(store.worksheet_titles(), vec!["Daily Tasks".to_string()]);
    }

    #[tokio::test]
    async fn test_unavailable_log_refuses_everything() {
        let log: ReportLog<InMemoryWorksheetStore> =
            ReportLog::unavailable(Arc::new(FixedClock::at(2026, 10, 17, 9, 15)));
        assert!(!log.is_available());

        let err = log
            .append(&ReportRecord::task(log.now(), "Cy", "Morning Audit"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportLogError::Unavailable));

        let err = log.query_today(ReportKind::Cleaning).await.unwrap_err();
        assert!(matches!(err, ReportLogError::Unavailable));
    }

    #[tokio::test]
    async fn test_failed_append_surfaces_error() {
        let log = log_at(17);
        log.store.as_ref().unwrap().set_fail_appends(true);

        let err = log
            .append(&ReportRecord::cleaning(log.now(), "Ana", "101", "Clean"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportLogError::Store(_)));
    }

    #[tokio::test]
    async fn test_header_is_written_after_failed_first_append() {
        let log = log_at(17);
        let store = log.store.as_ref().unwrap();

        store.set_fail_appends(true);
        let now = log.now();
        assert!(log
            .append(&ReportRecord::cleaning(now, "Ana", "101", "Clean"))
            .await
            .is_err());
        assert_eq!(store.rows("Cleaning"), Some(Vec::new()));

        store.set_fail_appends(false);
        log.append(&ReportRecord::cleaning(now, "Ana", "101", "Clean"))
            .await
            .unwrap();
        log.append(&ReportRecord::cleaning(now, "Ben", "102", "Dirty"))
            .await
            .unwrap();

        assert_eq!(
            store.rows("Cleaning").unwrap(),
            vec![
                row(&["Time", "Staff", "Room", "Status"]),
                row(&["2026-10-17 09:15", "Ana", "101", "Clean"]),
                row(&["2026-10-17 09:15", "Ben", "102", "Dirty"]),
            ]
        );
        let today = log.query_today(ReportKind::Cleaning).await.unwrap();
        assert_eq!(today.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_appends_write_one_header() {
        let log = log_at(17);
        log.store.as_ref().unwrap().set_slow_appends(true);
        let now = log.now();

        let ana = ReportRecord::task(now, "Ana", "Morning Audit");
        let ben = ReportRecord::task(now, "Ben", "Laundry Check");
        let (first, second) = tokio::join!(log.append(&ana), log.append(&ben));
        first.unwrap();
        second.unwrap();

        let rows = log.store.as_ref().unwrap().rows("Daily Tasks").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], row(&["Time", "Staff", "Task", "Status"]));
    }

    #[tokio::test]
    async fn test_query_today_filters_by_date() {
        let store = InMemoryWorksheetStore::new();
        store.add_worksheet("Cleaning", 4).await.unwrap();
        for cells in [
            ["Time", "Staff", "Room", "Status"],
            ["2026-10-16 22:10", "Ana", "100", "Dirty"],
            ["2026-10-17 07:55", "Ana", "101", "Clean"],
            ["", "Ben", "103", "Clean"],
            ["2026-10-17 08:20", "Ben", "102", "Dirty"],
        ] {
            store.append_row("Cleaning", row(&cells)).await.unwrap();
        }

        let log = ReportLog::new(store, Arc::new(FixedClock::at(2026, 10, 17, 12, 0)));
        let today = log.query_today(ReportKind::Cleaning).await.unwrap();

        let rooms: Vec<_> = today.iter().filter_map(|r| r.get("Room")).collect();
        assert_eq!(rooms, vec!["101", "102"]);
    }

    #[tokio::test]
    async fn test_query_today_on_missing_sheet_is_empty() {
        let log = log_at(17);
        assert!(log.query_today(ReportKind::Cleaning).await.unwrap().is_empty());
    }

    #[test]
    fn test_rows_for_date_accepts_timestamp_alias() {
        let rows = vec![
            row(&["Timestamp", "Staff", "Room", "Status"]),
            row(&["2026-10-17 10:00", "Ana", "201", "In Progress"]),
            row(&["not a date", "Ben", "202", "Clean"]),
        ];
        let today = rows_for_date(&rows, "2026-10-17");
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].get("Room"), Some("201"));
    }

    #[test]
    fn test_rows_for_date_without_timestamp_column() {
        let rows = vec![
            row(&["Staff", "Room"]),
            row(&["Ana", "2026-10-17"]),
        ];
        assert!(rows_for_date(&rows, "2026-10-17").is_empty());
        assert!(rows_for_date(&[], "2026-10-17").is_empty());
    }
}
