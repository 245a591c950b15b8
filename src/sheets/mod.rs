//! Spreadsheet backend client
//!
//! One authenticated client per process. The token is exchanged lazily on
//! first use and cached for the process lifetime; every read and write after
//! that reuses the same bearer token. Writes are single-cell and take effect
//! remotely with no read-back and no undo.

pub mod types;

pub use types::{RateRecord, PUSHED_FLAG_VALUE};

use crate::config::{SpreadsheetConfig, WorksheetSelector};
use crate::error::{AppError, Result};
use parking_lot::RwLock;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

/// Service-account credentials for the token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCredentials {
    pub client_email: String,
    pub private_key: String,
}

/// An opened spreadsheet document and its worksheet listing.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    pub document_id: String,
    pub worksheets: Vec<WorksheetInfo>,
}

#[derive(Debug, Clone)]
pub struct WorksheetInfo {
    pub id: i64,
    pub title: String,
}

/// A selected worksheet within an opened document. Cell addresses are
/// 1-based with row 1 reserved for the header.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetHandle {
    pub document_id: String,
    pub worksheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DocumentMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId")]
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Convert a 1-based column number to A1 letters (1 -> A, 27 -> AA).
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1 address for a 1-based (row, column) pair.
pub fn a1_cell(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Extract the document id from a spreadsheet URL
/// (`.../spreadsheets/d/{id}/...`).
pub fn extract_document_id(document_url: &str) -> Result<String> {
    let url = Url::parse(document_url)
        .map_err(|e| AppError::NotFound(format!("Invalid spreadsheet URL: {}", e)))?;
    let mut segments = url
        .path_segments()
        .ok_or_else(|| AppError::NotFound("Invalid spreadsheet URL: no path".to_string()))?;
    segments
        .by_ref()
        .find(|s| *s == "d")
        .and_then(|_| segments.next())
        .filter(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Invalid spreadsheet URL: no document id in {}",
                document_url
            ))
        })
}

/// Spreadsheet backend client. Constructed once at startup and injected into
/// the dashboard service; not re-authenticated per call.
pub struct SheetsClient {
    client: Client,
    api_base: String,
    token_uri: String,
    credentials: Option<ServiceCredentials>,
    token: RwLock<Option<String>>,
}

impl SheetsClient {
    /// Build a client from config, loading service-account credentials from
    /// disk. Missing credentials are not fatal here; they fail the refresh
    /// action when the first token exchange is attempted.
    pub fn new(config: &SpreadsheetConfig) -> Self {
        let credentials = config.credentials_path.as_deref().and_then(|path| {
            match std::fs::read_to_string(path) {
                Ok(raw) => match serde_json::from_str::<ServiceCredentials>(&raw) {
                    Ok(creds) => Some(creds),
                    Err(e) => {
                        warn!("Ignoring malformed credentials at {}: {}", path, e);
                        None
                    }
                },
                Err(e) => {
                    warn!("Spreadsheet credentials not readable at {}: {}", path, e);
                    None
                }
            }
        });

        Self::with_credentials(config, credentials)
    }

    pub fn with_credentials(
        config: &SpreadsheetConfig,
        credentials: Option<ServiceCredentials>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token_uri: config.token_uri.clone(),
            credentials,
            token: RwLock::new(None),
        }
    }

    /// Return the cached bearer token, exchanging credentials for one on
    /// first use.
    async fn ensure_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().clone() {
            return Ok(token);
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            AppError::Auth("Spreadsheet credentials are not configured".to_string())
        })?;

        debug!("Exchanging service-account credentials for access token");

        let response = self
            .client
            .post(&self.token_uri)
            .json(&serde_json::json!({
                "client_email": credentials.client_email,
                "private_key": credentials.private_key,
                "scope": "spreadsheets",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Token exchange failed: {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        *self.token.write() = Some(token.access_token.clone());
        info!("Spreadsheet backend authenticated");
        Ok(token.access_token)
    }

    /// Open a document by URL and list its worksheets.
    pub async fn open_document(&self, document_url: &str) -> Result<DocumentHandle> {
        let document_id = extract_document_id(document_url)?;
        let token = self.ensure_token().await?;

        let response = self
            .client
            .get(format!("{}/v4/spreadsheets/{}", self.api_base, document_id))
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Auth(format!(
                    "Spreadsheet access denied for document {}",
                    document_id
                )));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(AppError::NotFound(format!(
                    "Document {} not accessible: {}: {}",
                    document_id, status, body
                )));
            }
        }

        let metadata: DocumentMetadata = response.json().await?;
        Ok(DocumentHandle {
            document_id,
            worksheets: metadata
                .sheets
                .into_iter()
                .map(|s| WorksheetInfo {
                    id: s.properties.sheet_id,
                    title: s.properties.title,
                })
                .collect(),
        })
    }

    /// Select a worksheet by numeric id or by name.
    pub fn select_worksheet(
        &self,
        document: &DocumentHandle,
        selector: &WorksheetSelector,
    ) -> Result<WorksheetHandle> {
        let found = match selector {
            WorksheetSelector::ById(id) => {
                document.worksheets.iter().find(|ws| ws.id == *id)
            }
            WorksheetSelector::ByName(name) => {
                document.worksheets.iter().find(|ws| ws.title == *name)
            }
        };

        found
            .map(|ws| WorksheetHandle {
                document_id: document.document_id.clone(),
                worksheet_id: ws.id,
                title: ws.title.clone(),
            })
            .ok_or_else(|| match selector {
                WorksheetSelector::ById(id) => {
                    AppError::WorksheetNotFound(format!("no worksheet with id {}", id))
                }
                WorksheetSelector::ByName(name) => {
                    AppError::WorksheetNotFound(format!("no worksheet named {:?}", name))
                }
            })
    }

    async fn get_values(&self, worksheet: &WorksheetHandle, range: &str) -> Result<ValueRange> {
        let token = self.ensure_token().await?;
        let full_range = if range.is_empty() {
            worksheet.title.clone()
        } else {
            format!("{}!{}", worksheet.title, range)
        };

        let response = self
            .client
            .get(format!(
                "{}/v4/spreadsheets/{}/values/{}",
                self.api_base,
                worksheet.document_id,
                urlencoding::encode(&full_range)
            ))
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NotFound(format!(
                "Failed to read {}: {}: {}",
                full_range, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Read the whole worksheet into records. The first row is the header;
    /// short rows pad with absent values.
    pub async fn read_all_records(
        &self,
        worksheet: &WorksheetHandle,
        price_column: &str,
    ) -> Result<Vec<RateRecord>> {
        let values = self.get_values(worksheet, "").await?;
        let mut rows = values.values.into_iter();

        let header: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(cell_to_string).collect(),
            None => return Ok(Vec::new()),
        };

        let mut records = Vec::new();
        for row in rows {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            records.push(RateRecord::from_row(&header, &cells, price_column)?);
        }

        debug!("Read {} records from {:?}", records.len(), worksheet.title);
        Ok(records)
    }

    /// Read one full column (1-based), header cell included. Used to resolve
    /// a row key to its current position at write time.
    pub async fn read_column(&self, worksheet: &WorksheetHandle, col: u32) -> Result<Vec<String>> {
        let letters = column_letters(col);
        let values = self
            .get_values(worksheet, &format!("{}:{}", letters, letters))
            .await?;

        // One inner vector per row when reading a single column.
        Ok(values
            .values
            .iter()
            .map(|row| row.first().map(cell_to_string).unwrap_or_default())
            .collect())
    }

    /// Write a single cell. Row and column are 1-based; row 1 is the header.
    /// The remote store is mutated immediately, with no confirmation
    /// read-back.
    pub async fn write_cell(
        &self,
        worksheet: &WorksheetHandle,
        row: u32,
        col: u32,
        value: &str,
    ) -> Result<()> {
        let token = self.ensure_token().await?;
        let range = format!("{}!{}", worksheet.title, a1_cell(row, col));

        let response = self
            .client
            .put(format!(
                "{}/v4/spreadsheets/{}/values/{}?valueInputOption=RAW",
                self.api_base,
                worksheet.document_id,
                urlencoding::encode(&range)
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "values": [[value]] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Write(format!(
                "Failed to write {}: {}: {}",
                range, status, body
            )));
        }

        info!("Wrote {:?} to {}", value, range);
        Ok(())
    }
}
