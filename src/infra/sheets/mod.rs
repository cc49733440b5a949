// =============================================================================
// SHEETS MODULE
// =============================================================================
//
// Worksheet stores backing the report log.
//
// - `GoogleSheetsClient`: the production store, a shared Google spreadsheet
//   with one worksheet per report kind.
// - `InMemoryWorksheetStore`: process-local, for running without credentials
//   and for tests.
//
// The composition root picks one at startup; `WorksheetBackend` lets the
// rest of the bot stay generic over a single concrete type.

pub mod google_sheets_client;
pub mod in_memory;

pub use google_sheets_client::{GoogleSheetsClient, ServiceAccountAuth};
pub use in_memory::InMemoryWorksheetStore;

use crate::core::reports::{StoreError, WorksheetStore};
use async_trait::async_trait;

pub enum WorksheetBackend {
    Google(GoogleSheetsClient),
    InMemory(InMemoryWorksheetStore),
}

#[async_trait]
impl WorksheetStore for WorksheetBackend {
    async fn worksheet_exists(&self, title: &str) -> Result<bool, StoreError> {
        match self {
            WorksheetBackend::Google(store) => store.worksheet_exists(title).await,
            WorksheetBackend::InMemory(store) => store.worksheet_exists(title).await,
        }
    }

    async fn add_worksheet(&self, title: &str, columns: usize) -> Result<(), StoreError> {
        match self {
            WorksheetBackend::Google(store) => store.add_worksheet(title, columns).await,
            WorksheetBackend::InMemory(store) => store.add_worksheet(title, columns).await,
        }
    }

    async fn append_row(&self, title: &str, cells: Vec<String>) -> Result<(), StoreError> {
        match self {
            WorksheetBackend::Google(store) => store.append_row(title, cells).await,
            WorksheetBackend::InMemory(store) => store.append_row(title, cells).await,
        }
    }

    async fn read_rows(&self, title: &str) -> Result<Option<Vec<Vec<String>>>, StoreError> {
        match self {
            WorksheetBackend::Google(store) => store.read_rows(title).await,
            WorksheetBackend::InMemory(store) => store.read_rows(title).await,
        }
    }
}
