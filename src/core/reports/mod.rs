pub mod clock;
pub mod report_log;
pub mod report_models;
pub mod worksheet_store;

pub use clock::{Clock, SystemClock};
pub use report_log::{ReportLog, ReportLogError};
pub use report_models::{
    LoggedRow, ReportKind, ReportRecord, CLEANING_STATUSES, DAILY_TASKS,
};
pub use worksheet_store::{StoreError, WorksheetStore};

#[cfg(test)]
pub use clock::FixedClock;
