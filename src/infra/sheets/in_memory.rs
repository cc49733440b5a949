// In-memory worksheet store.
//
// Used when the bot runs with HOTELFLOW_STORAGE=memory (no Google
// credentials needed) and as the store behind the core tests. Reports kept
// here are lost on restart.

use crate::core::reports::{StoreError, WorksheetStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub struct InMemoryWorksheetStore {
    /// Worksheet title -> rows (header row included once written).
    sheets: DashMap<String, Vec<Vec<String>>>,
    fail_appends: AtomicBool,
    // Suspend once per append, the way a network round trip would.
    slow_appends: AtomicBool,
    reads: AtomicUsize,
}

impl InMemoryWorksheetStore {
    pub fn new() -> Self {
        Self {
            sheets: DashMap::new(),
            fail_appends: AtomicBool::new(false),
            slow_appends: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    pub fn rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        self.sheets.get(title).map(|rows| rows.clone())
    }

    #[cfg(test)]
    pub fn worksheet_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.sheets.iter().map(|e| e.key().clone()).collect();
        titles.sort();
        titles
    }

    /// Makes every following append fail, as a dropped connection would.
    #[cfg(test)]
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn set_slow_appends(&self, slow: bool) {
        self.slow_appends.store(slow, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryWorksheetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorksheetStore for InMemoryWorksheetStore {
    async fn worksheet_exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.sheets.contains_key(title))
    }

    async fn add_worksheet(&self, title: &str, _columns: usize) -> Result<(), StoreError> {
        // entry() keeps check-and-insert atomic across concurrent creators
        match self.sheets.entry(title.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(StoreError::AlreadyExists(title.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Vec::new());
                Ok(())
            }
        }
    }

    async fn append_row(&self, title: &str, cells: Vec<String>) -> Result<(), StoreError> {
        if self.slow_appends.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection reset".to_string()));
        }

        match self.sheets.get_mut(title) {
            Some(mut rows) => {
                rows.push(cells);
                Ok(())
            }
            None => Err(StoreError::Api {
                status: 400,
                message: format!("Unable to parse range: '{}'", title),
            }),
        }
    }

    async fn read_rows(&self, title: &str) -> Result<Option<Vec<Vec<String>>>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.sheets.get(title).map(|rows| rows.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_worksheet_twice_reports_existing() {
        let store = InMemoryWorksheetStore::new();
        store.add_worksheet("Cleaning", 4).await.unwrap();

        let err = store.add_worksheet("Cleaning", 4).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(title) if title == "Cleaning"));
    }

    #[tokio::test]
    async fn test_append_to_missing_sheet_fails() {
        let store = InMemoryWorksheetStore::new();
        let result = store.append_row("Nowhere", vec!["x".to_string()]).await;
        assert!(result.is_err());
        assert_eq!(store.read_rows("Nowhere").await.unwrap(), None);
    }
}
