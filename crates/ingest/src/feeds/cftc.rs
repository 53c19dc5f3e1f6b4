//! CFTC legacy futures-only report archive.
//!
//! One zip per calendar year at `{base}/files/dea/history/deacot{year}.zip`,
//! holding a single CSV named `annual.txt`.

use async_trait::async_trait;
use positioning_core::{
    CotYear, PositioningError, PositioningFeed, RawCotRow, Result, RetryConfig,
};
use reqwest::Client;
use std::io::{Cursor, Read, Seek};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::http::{build_client, check_status, transport_error};
use crate::normalize::normalize_header;
use crate::retry::with_retry;

/// Name of the CSV entry inside each yearly archive.
pub const ANNUAL_ENTRY: &str = "annual.txt";

/// Downloads and decodes yearly COT archives.
#[derive(Debug, Clone)]
pub struct CftcPositioningFeed {
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl CftcPositioningFeed {
    /// # Errors
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64, retry: RetryConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    #[must_use]
    pub fn archive_url(&self, year: i32) -> String {
        format!("{}/files/dea/history/deacot{year}.zip", self.base_url)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        check_status(url, response.status())?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PositioningFeed for CftcPositioningFeed {
    async fn fetch_year(&self, year: i32) -> Result<CotYear> {
        let url = self.archive_url(year);
        let bytes = with_retry(&self.retry, &url, || self.download(&url)).await?;
        let parsed = parse_archive(Cursor::new(bytes))?;
        info!(
            "Fetched {} COT rows for {} ({} unreadable)",
            parsed.rows.len(),
            year,
            parsed.skipped
        );
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "cftc"
    }
}

/// Reads `annual.txt` from a yearly archive into rows keyed by normalised
/// column name. Unreadable records are logged and counted, not fatal.
///
/// # Errors
/// Returns `Validation` if the archive, the entry or the header is malformed.
pub fn parse_archive<R: Read + Seek>(reader: R) -> Result<CotYear> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| PositioningError::validation(format!("invalid COT archive: {e}")))?;
    let entry = archive
        .by_name(ANNUAL_ENTRY)
        .map_err(|e| PositioningError::validation(format!("{ANNUAL_ENTRY}: {e}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(entry);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PositioningError::validation(format!("{ANNUAL_ENTRY} header: {e}")))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut parsed = CotYear::default();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping unreadable {} record: {}", ANNUAL_ENTRY, err);
                parsed.skipped += 1;
                continue;
            }
        };
        let mut row = RawCotRow::default();
        for (column, value) in headers.iter().zip(record.iter()) {
            row.insert(column.clone(), value);
        }
        parsed.rows.push(row);
    }

    Ok(parsed)
}
