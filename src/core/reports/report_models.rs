// Report records and the fixed worksheet layout each kind is written into.
// Nothing in here knows about Google or Discord: a record is just a row of
// strings destined for a named table.

use chrono::NaiveDateTime;

/// How timestamps are written into the log. Spreadsheet users read this
/// column directly, so it stays human-friendly.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date prefix of [`TIMESTAMP_FORMAT`], used to match "today's" rows.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Choices offered when a room's cleaning status is requested.
pub const CLEANING_STATUSES: [&str; 3] = ["Clean", "In Progress", "Dirty"];

/// The daily tasks staff can tick off.
pub const DAILY_TASKS: [&str; 3] = ["Morning Audit", "Laundry Check", "Breakfast Prep"];

const MAINTENANCE_OPENED: &str = "Pending";
const TASK_COMPLETED: &str = "Completed";

/// The three kinds of report, one worksheet each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Cleaning,
    Maintenance,
    Task,
}

impl ReportKind {
    /// Title of the worksheet holding this kind of report.
    pub fn sheet_title(&self) -> &'static str {
        match self {
            ReportKind::Cleaning => "Cleaning",
            ReportKind::Maintenance => "Maintenance",
            ReportKind::Task => "Daily Tasks",
        }
    }

    /// Header row written when the worksheet is first created.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Cleaning => &["Time", "Staff", "Room", "Status"],
            ReportKind::Maintenance => &["Time", "Staff", "Issue", "Status"],
            ReportKind::Task => &["Time", "Staff", "Task", "Status"],
        }
    }
}

/// A single report, immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRecord {
    Cleaning {
        timestamp: NaiveDateTime,
        staff: String,
        room: String,
        status: String,
    },
    Maintenance {
        timestamp: NaiveDateTime,
        staff: String,
        issue: String,
        status: String,
    },
    Task {
        timestamp: NaiveDateTime,
        staff: String,
        task: String,
        status: String,
    },
}

impl ReportRecord {
    pub fn cleaning(
        timestamp: NaiveDateTime,
        staff: impl Into<String>,
        room: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        ReportRecord::Cleaning {
            timestamp,
            staff: staff.into(),
            room: room.into(),
            status: status.into(),
        }
    }

    /// New maintenance issues always start out pending.
    pub fn maintenance(
        timestamp: NaiveDateTime,
        staff: impl Into<String>,
        issue: impl Into<String>,
    ) -> Self {
        ReportRecord::Maintenance {
            timestamp,
            staff: staff.into(),
            issue: issue.into(),
            status: MAINTENANCE_OPENED.to_string(),
        }
    }

    /// Tasks are only reported once done.
    pub fn task(timestamp: NaiveDateTime, staff: impl Into<String>, task: impl Into<String>) -> Self {
        ReportRecord::Task {
            timestamp,
            staff: staff.into(),
            task: task.into(),
            status: TASK_COMPLETED.to_string(),
        }
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportRecord::Cleaning { .. } => ReportKind::Cleaning,
            ReportRecord::Maintenance { .. } => ReportKind::Maintenance,
            ReportRecord::Task { .. } => ReportKind::Task,
        }
    }

    /// Cells in the same order as [`ReportKind::columns`].
    pub fn to_row(&self) -> Vec<String> {
        match self {
            ReportRecord::Cleaning {
                timestamp,
                staff,
                room,
                status,
            } => vec![format_timestamp(timestamp), staff.clone(), room.clone(), status.clone()],
            ReportRecord::Maintenance {
                timestamp,
                staff,
                issue,
                status,
            } => vec![format_timestamp(timestamp), staff.clone(), issue.clone(), status.clone()],
            ReportRecord::Task {
                timestamp,
                staff,
                task,
                status,
            } => vec![format_timestamp(timestamp), staff.clone(), task.clone(), status.clone()],
        }
    }
}

fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// A row read back from a worksheet, paired with that worksheet's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggedRow {
    cells: Vec<(String, String)>,
}

impl LoggedRow {
    /// Pairs each value with its header. Sheets drop trailing empty cells,
    /// so short rows simply have fewer columns.
    pub fn from_parts(headers: &[String], values: &[String]) -> Self {
        let cells = headers
            .iter()
            .zip(values.iter())
            .map(|(header, value)| (header.trim().to_string(), value.clone()))
            .collect();
        Self { cells }
    }

    /// Looks up a column by header, ignoring case and surrounding whitespace.
    pub fn get(&self, column: &str) -> Option<&str> {
        let wanted = column.trim();
        self.cells
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value.as_str())
    }

    /// First value found under any of the given header names.
    pub fn get_any(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| self.get(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(hour, minute, 42)
            .unwrap()
    }

    #[test]
    fn test_rows_follow_column_order() {
        let record = ReportRecord::cleaning(at(9, 5), "Ana", "101", "Clean");
        assert_eq!(
            record.to_row(),
            vec!["2026-10-17 09:05", "Ana", "101", "Clean"]
        );
        assert_eq!(record.to_row().len(), record.kind().columns().len());
    }

    #[test]
    fn test_maintenance_and_task_statuses() {
        let issue = ReportRecord::maintenance(at(10, 0), "Ben", "Leaking tap in 204");
        assert_eq!(issue.to_row()[3], "Pending");
        assert_eq!(issue.kind(), ReportKind::Maintenance);

        let task = ReportRecord::task(at(11, 30), "Cy", "Laundry Check");
        assert_eq!(task.to_row(), vec!["2026-10-17 11:30", "Cy", "Laundry Check", "Completed"]);
        assert_eq!(task.kind().sheet_title(), "Daily Tasks");
    }

    #[test]
    fn test_logged_row_lookup_is_case_insensitive() {
        let headers = vec![" time".to_string(), "Staff".to_string(), "Room".to_string()];
        let values = vec!["2026-10-17 08:00".to_string(), "Ana".to_string()];
        let row = LoggedRow::from_parts(&headers, &values);

        assert_eq!(row.get("Time"), Some("2026-10-17 08:00"));
        assert_eq!(row.get("STAFF"), Some("Ana"));
        // Trailing cell was missing from the sheet response.
        assert_eq!(row.get("Room"), None);
        assert_eq!(row.get_any(&["Timestamp", "Time"]), Some("2026-10-17 08:00"));
    }
}
