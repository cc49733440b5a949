// =============================================================================
// GOOGLE SHEETS CLIENT WITH SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// Talks to the Google Sheets REST API (v4) directly with reqwest. The report
// log only needs four things from a spreadsheet: list worksheets, add one,
// append a row, and read everything back, so a full SDK would be overkill.
//
// **Setup:**
// 1. Create a service account in Google Cloud Console and enable the
//    Google Sheets API for its project.
// 2. Download a JSON key for it.
// 3. Share the target spreadsheet with the service account email
//    (name@project.iam.gserviceaccount.com) as an Editor.
// 4. Set environment variables:
//    - `GOOGLE_SHEET_ID` - the id from the spreadsheet URL
//    - `GOOGLE_SERVICE_ACCOUNT_KEY` - path to the JSON key file
//      OR
//    - `GOOGLE_SERVICE_ACCOUNT_JSON` - the JSON content itself

use crate::core::reports::{StoreError, WorksheetStore};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

// New worksheets get this many rows up front; appends grow the grid anyway.
const NEW_SHEET_ROWS: usize = 500;

// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// The service account email (used as issuer in JWT).
    client_email: String,

    /// The private key in PEM format.
    private_key: String,

    /// Where to exchange the signed JWT for an access token.
    token_uri: String,
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Handles OAuth2 with service account credentials.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub async fn from_file(path: &str) -> Result<Self, StoreError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Auth(format!("cannot read key file {}: {}", path, e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)?;
        Ok(Self {
            credentials,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Gets a valid access token, refreshing it shortly before expiry.
    pub async fn get_access_token(&self) -> Result<String, StoreError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + Duration::from_secs(300) {
                    return Ok(token.token.clone());
                }
            }
        }

        let fresh = self.fetch_new_token().await?;
        let token = fresh.access_token.clone();

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                token: fresh.access_token,
                expires_at: SystemTime::now() + Duration::from_secs(fresh.expires_in),
            });
        }

        Ok(token)
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, StoreError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| StoreError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("invalid private key: {}", e)))?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format!(
                "token exchange failed ({}): {}",
                status, text
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| StoreError::Auth(format!("malformed token response: {}", e)))
    }
}

// =============================================================================
// GOOGLE SHEETS API RESPONSE STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

// =============================================================================
// GOOGLE SHEETS CLIENT
// =============================================================================

pub struct GoogleSheetsClient {
    client: Client,
    auth: ServiceAccountAuth,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(auth: ServiceAccountAuth, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            auth,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// Checks credentials and document access by fetching the worksheet list.
    pub async fn connect(&self) -> Result<Vec<String>, StoreError> {
        let titles = self.sheet_titles().await?;
        tracing::info!(
            spreadsheet = %self.spreadsheet_id,
            worksheets = titles.len(),
            "Connected to Google Sheets"
        );
        Ok(titles)
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let mut url = self.spreadsheet_url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self.send(self.client.get(url)).await?;
        let meta: SpreadsheetMeta = response.json().await.map_err(transport)?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// `https://.../spreadsheets/{id}/{segments...}` with each segment
    /// percent-encoded (worksheet titles may contain spaces).
    fn spreadsheet_url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(SHEETS_API_BASE).map_err(|e| StoreError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport("base URL cannot hold a path".to_string()))?
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    /// Attaches a bearer token, sends, and turns non-2xx replies into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.auth.get_access_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(transport)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api { status, message })
    }
}

/// A1 notation for a whole worksheet. Titles are always quoted, with
/// embedded quotes doubled.
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl WorksheetStore for GoogleSheetsClient {
    async fn worksheet_exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self.sheet_titles().await?.iter().any(|t| t == title))
    }

    async fn add_worksheet(&self, title: &str, columns: usize) -> Result<(), StoreError> {
        let url = self.spreadsheet_url(&[])?;
        // batchUpdate lives on the spreadsheet resource itself: `{id}:batchUpdate`
        let url = Url::parse(&format!("{}:batchUpdate", url))
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": columns,
                        }
                    }
                }
            }]
        });

        match self.send(self.client.post(url).json(&body)).await {
            Ok(_) => Ok(()),
            Err(StoreError::Api { status: 400, message }) if message.contains("already exists") => {
                Err(StoreError::AlreadyExists(title.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    async fn append_row(&self, title: &str, cells: Vec<String>) -> Result<(), StoreError> {
        let segment = format!("{}:append", sheet_range(title));
        let mut url = self.spreadsheet_url(&["values", &segment])?;
        url.query_pairs_mut()
            // RAW keeps "2026-10-17 09:15" as text so it reads back unchanged.
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = json!({ "values": [cells] });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }

    async fn read_rows(&self, title: &str) -> Result<Option<Vec<Vec<String>>>, StoreError> {
        let range = sheet_range(title);
        let url = self.spreadsheet_url(&["values", &range])?;

        let response = match self.send(self.client.get(url)).await {
            Ok(response) => response,
            Err(StoreError::Api { status: 400, message }) if message.contains("Unable to parse range") => {
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let range: ValueRange = response.json().await.map_err(transport)?;
        let rows = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_range_quotes_titles() {
        assert_eq!(sheet_range("Cleaning"), "'Cleaning'");
        assert_eq!(sheet_range("Daily Tasks"), "'Daily Tasks'");
        assert_eq!(sheet_range("Bob's Sheet"), "'Bob''s Sheet'");
    }

    #[test]
    fn test_cell_text_flattens_json_values() {
        assert_eq!(cell_text(json!("101")), "101");
        assert_eq!(cell_text(json!(101)), "101");
        assert_eq!(cell_text(serde_json::Value::Null), "");
    }

    #[test]
    fn test_credentials_require_all_fields() {
        let missing_key = r#"{"client_email":"bot@example.iam.gserviceaccount.com","token_uri":"https://oauth2.googleapis.com/token"}"#;
        assert!(matches!(
            ServiceAccountAuth::from_json(missing_key),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_spreadsheet_url_encodes_titles() {
        let auth = ServiceAccountAuth::from_json(
            r#"{"client_email":"bot@example.iam.gserviceaccount.com","private_key":"unused","token_uri":"https://oauth2.googleapis.com/token"}"#,
        )
        .unwrap();
        let client = GoogleSheetsClient::new(auth, "sheet123");

        let url = client
            .spreadsheet_url(&["values", &sheet_range("Daily Tasks")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/'Daily%20Tasks'"
        );
    }
}
