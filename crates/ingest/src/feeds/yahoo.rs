//! Yahoo Finance chart API.
//!
//! Bars are keyed by their UTC trading date at midnight. The bar for the
//! current day is still moving and is left out until the day closes.

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use positioning_core::{PositioningError, PriceBar, PriceFeed, Result, RetryConfig};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::http::{build_client, check_status, transport_error};
use crate::retry::with_retry;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily closes from the chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooPriceFeed {
    http: Client,
    base_url: String,
    retry: RetryConfig,
}

impl YahooPriceFeed {
    /// # Errors
    /// Returns `Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64, retry: RetryConfig) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout_secs)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    async fn fetch_chart(&self, url: &str, period1: i64, period2: i64) -> Result<ChartResponse> {
        debug!("GET {} period1={} period2={}", url, period1, period2);
        let response = self
            .http
            .get(url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        check_status(url, response.status())?;

        response
            .json::<ChartResponse>()
            .await
            .map_err(|e| transport_error(url, e))
    }
}

#[async_trait]
impl PriceFeed for YahooPriceFeed {
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker.trim());
        let period1 = midnight(start);
        // `end` is inclusive.
        let period2 = midnight(end.checked_add_days(Days::new(1)).unwrap_or(end));

        let chart = with_retry(&self.retry, &url, || self.fetch_chart(&url, period1, period2))
            .await?
            .chart;
        bars_from_chart(ticker, chart, Utc::now().date_naive())
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

fn midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn bars_from_chart(ticker: &str, chart: Chart, today: NaiveDate) -> Result<Vec<PriceBar>> {
    if let Some(error) = chart.error {
        return Err(PositioningError::validation(format!(
            "{ticker}: {} ({})",
            error.description.unwrap_or_default(),
            error.code.unwrap_or_default()
        )));
    }

    let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    // A later bar for the same date replaces an earlier one.
    let mut by_date: BTreeMap<NaiveDate, Option<Decimal>> = BTreeMap::new();
    for (i, ts) in result.timestamp.iter().enumerate() {
        let date = DateTime::<Utc>::from_timestamp(*ts, 0)
            .ok_or_else(|| {
                PositioningError::validation(format!("{ticker}: invalid timestamp {ts}"))
            })?
            .date_naive();
        if date >= today {
            debug!("Leaving out unfinished {} bar for {}", date, ticker);
            continue;
        }
        let close = closes
            .get(i)
            .copied()
            .flatten()
            .and_then(|c| Decimal::try_from(c).ok());
        by_date.insert(date, close);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, close)| PriceBar {
            timestamp: date.and_time(NaiveTime::MIN).and_utc(),
            close,
        })
        .collect())
}
