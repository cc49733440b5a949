use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Sheets API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Worksheet '{0}' already exists")]
    AlreadyExists(String),
}

/// Port for the spreadsheet document holding the report log.
///
/// A document is a set of named worksheets, each a list of rows of text
/// cells. Implementations only ever add worksheets and append rows.
#[async_trait]
pub trait WorksheetStore: Send + Sync {
    async fn worksheet_exists(&self, title: &str) -> Result<bool, StoreError>;

    /// Creates an empty worksheet sized for `columns` columns.
    /// Returns [`StoreError::AlreadyExists`] if the title is already taken.
    async fn add_worksheet(&self, title: &str, columns: usize) -> Result<(), StoreError>;

    /// Appends one row after the last non-empty row of the worksheet.
    async fn append_row(&self, title: &str, cells: Vec<String>) -> Result<(), StoreError>;

    /// All rows including the header row, or `None` if the worksheet is missing.
    async fn read_rows(&self, title: &str) -> Result<Option<Vec<Vec<String>>>, StoreError>;
}
