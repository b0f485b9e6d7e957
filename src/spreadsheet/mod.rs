//! Spreadsheet loading
//!
//! A [`SpreadsheetLoader`] turns a user-supplied link into a [`Dataset`].
//! [`GoogleSheetsLoader`] implements it against the Google Sheets v4 REST API.

use crate::config::SpreadsheetConfig;
use crate::dataset::{Dataset, Table};
use crate::error::{Result, SheetchatError};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Loads every table of a spreadsheet
#[async_trait]
pub trait SpreadsheetLoader: Send + Sync {
    /// Load all non-empty sheets behind `url`, in sheet order
    ///
    /// # Errors
    ///
    /// Returns `SpreadsheetLoad` on any failure; a load never yields a
    /// partial dataset
    async fn load(&self, url: &str) -> Result<Dataset>;
}

/// Google Sheets v4 loader
pub struct GoogleSheetsLoader {
    client: Client,
    api_base: Url,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
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
    values: Vec<Vec<Value>>,
}

impl GoogleSheetsLoader {
    /// Create a loader from spreadsheet configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API base is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(config: &SpreadsheetConfig) -> Result<Self> {
        let api_base = Url::parse(&config.api_base).map_err(|e| {
            SheetchatError::Config(format!("Invalid spreadsheet api_base: {}", e))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                SheetchatError::SpreadsheetLoad(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_base,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetchatError::Config("Spreadsheet api_base cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SheetchatError::SpreadsheetLoad(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetchatError::SpreadsheetLoad(format!(
                "Sheets API returned {}: {}",
                status, body
            ))
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            SheetchatError::SpreadsheetLoad(format!("Unexpected Sheets API response: {}", e))
                .into()
        })
    }
}

#[async_trait]
impl SpreadsheetLoader for GoogleSheetsLoader {
    async fn load(&self, url: &str) -> Result<Dataset> {
        let id = spreadsheet_id(url).ok_or_else(|| {
            SheetchatError::SpreadsheetLoad(format!("Not a spreadsheet link: {}", url))
        })?;

        let metadata: SpreadsheetMetadata = self
            .get_json(self.endpoint(&["v4", "spreadsheets", &id])?)
            .await?;

        let mut tables = Vec::with_capacity(metadata.sheets.len());
        for sheet in metadata.sheets {
            let title = sheet.properties.title;
            let range: ValueRange = self
                .get_json(self.endpoint(&[
                    "v4",
                    "spreadsheets",
                    &id,
                    "values",
                    &sheet_range(&title),
                ])?)
                .await?;

            let rows = range
                .values
                .into_iter()
                .map(|row| row.into_iter().map(cell_text).collect())
                .collect();

            match Table::from_sheet_rows(title.clone(), rows) {
                Some(table) => tables.push(table),
                None => tracing::debug!("Skipping empty sheet {}", title),
            }
        }

        if tables.is_empty() {
            return Err(
                SheetchatError::SpreadsheetLoad("Spreadsheet has no data".to_string()).into(),
            );
        }

        tracing::info!("Loaded {} tables from spreadsheet {}", tables.len(), id);
        Ok(Dataset::new(tables))
    }
}

/// A1 range covering the whole sheet named `title`
///
/// The title is always quoted so names like `Q1` are not read as cell
/// references.
///
/// # Examples
///
/// ```
/// use sheetchat::spreadsheet::sheet_range;
///
/// assert_eq!(sheet_range("Q1"), "'Q1'");
/// assert_eq!(sheet_range("Bob's data"), "'Bob''s data'");
/// ```
pub fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Extract the spreadsheet id from a sharing link, or accept a bare id
///
/// # Examples
///
/// ```
/// use sheetchat::spreadsheet::spreadsheet_id;
///
/// let url = "https://docs.google.com/spreadsheets/d/1AbC-d_9/edit#gid=0";
/// assert_eq!(spreadsheet_id(url).as_deref(), Some("1AbC-d_9"));
/// assert_eq!(spreadsheet_id("https://example.com/file.csv"), None);
/// ```
pub fn spreadsheet_id(input: &str) -> Option<String> {
    let input = input.trim();
    let link = Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").ok()?;
    if let Some(captures) = link.captures(input) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }

    let bare = Regex::new(r"^[a-zA-Z0-9_-]{20,}$").ok()?;
    bare.is_match(input).then(|| input.to_string())
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
