//! End-to-end ingestion runs against in-memory storage and scripted feeds.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use positioning_core::{
    AlertConfig, AlertKind, CotYear, IngestConfig, PositioningError, PositioningFeed, PriceBar,
    PriceFeed, RawCotRow, Result, Source,
};
use positioning_data::{AlertStore, MarketRegistry, MemoryMarketStore};
use positioning_ingest::normalize::columns;
use positioning_ingest::IngestPipeline;
use rust_decimal::Decimal;
use std::sync::Arc;

const GOLD: &str = "GOLD - COMMODITY EXCHANGE INC.";

/// Serves a fixed number of daily closes; tickers starting with `DOWN` fail.
struct ScriptedPrices;

#[async_trait]
impl PriceFeed for ScriptedPrices {
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        if ticker.starts_with("DOWN") {
            return Err(PositioningError::connectivity("connection refused"));
        }
        let first = Utc
            .with_ymd_and_hms(start.year(), start.month(), start.day(), 0, 0, 0)
            .unwrap();
        Ok((0..10)
            .map(|i| PriceBar {
                timestamp: first + Duration::days(i),
                close: Some(Decimal::from(2_000 + i)),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Weekly gold reports with a steadily rising speculator net; one
/// malformed row and one unreadable record per year, and year 2019 is
/// unavailable.
struct ScriptedReports;

fn row(date: NaiveDate, net: i64) -> RawCotRow {
    let mut row = RawCotRow::default();
    row.insert(columns::MARKET_NAME, format!("{GOLD}   "));
    row.insert(columns::CONTRACT_CODE, "088691");
    row.insert(columns::REPORT_DATE, date.format("%Y-%m-%d").to_string());
    row.insert(columns::COMMERCIAL_LONG, "100000");
    row.insert(columns::COMMERCIAL_SHORT, "200000");
    row.insert(columns::LARGE_SPEC_LONG, (100_000 + net).to_string());
    row.insert(columns::LARGE_SPEC_SHORT, "100000");
    row.insert(columns::SMALL_SPEC_LONG, "10000");
    row.insert(columns::SMALL_SPEC_SHORT, "10000");
    row
}

#[async_trait]
impl PositioningFeed for ScriptedReports {
    async fn fetch_year(&self, year: i32) -> Result<CotYear> {
        if year == 2019 {
            return Err(PositioningError::connectivity("503 Service Unavailable"));
        }
        let first = NaiveDate::from_ymd_opt(year, 1, 7).unwrap();
        let offset = i64::from(year - 2020) * 52;
        let mut rows: Vec<RawCotRow> = (0..52)
            .map(|week| row(first + Duration::weeks(week), (offset + week) * 100))
            .collect();

        let mut broken = row(first, 0);
        broken.insert(columns::REPORT_DATE, "");
        rows.push(broken);
        Ok(CotYear { rows, skipped: 1 })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn pipeline() -> (Arc<MemoryMarketStore>, IngestPipeline<MemoryMarketStore>) {
    let store = Arc::new(MemoryMarketStore::new());
    let pipeline = IngestPipeline::new(Arc::clone(&store), AlertConfig::default());
    (store, pipeline)
}

#[tokio::test]
async fn test_prices_and_reports_share_one_market() {
    let (store, pipeline) = pipeline();
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let prices = pipeline
        .ingest_prices(&ScriptedPrices, &["GC=F".to_string()], start, start)
        .await;
    let reports = pipeline.ingest_cot(&ScriptedReports, 2020..=2020).await;

    assert_eq!(prices.markets, reports.markets);
    assert_eq!(store.market_count(), 1);
    // Ticker, verbose report name and contract code.
    assert_eq!(store.alias_count(), 3);

    let gold = store.find_by_name("XAU").await.unwrap().unwrap();
    let by_code = store
        .find_by_alias(Source::Internal, "088691")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_code.id, gold.id);
    assert_eq!(store.price_count(gold.id), 10);
    assert_eq!(store.report_count(gold.id), 52);
    assert_eq!(reports.report.rows_written, 52);
    assert_eq!(reports.report.rows_skipped, 2);
}

#[tokio::test]
async fn test_failed_ticker_does_not_stop_the_run() {
    let (store, pipeline) = pipeline();
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let tickers = vec![
        "BTC-USD".to_string(),
        "DOWN-USD".to_string(),
        "ETH-USD".to_string(),
    ];

    let outcome = pipeline
        .ingest_prices(&ScriptedPrices, &tickers, start, start)
        .await;

    assert_eq!(outcome.report.markets_processed, 2);
    assert_eq!(outcome.report.rows_written, 20);
    assert_eq!(outcome.report.failures.len(), 1);
    assert_eq!(outcome.report.failures[0].market, "DOWN-USD");
    assert!(outcome.report.failures[0].error.is_retryable());
    // Nothing is created for a ticker whose fetch failed.
    assert_eq!(store.market_count(), 2);
}

#[tokio::test]
async fn test_unavailable_year_is_recorded() {
    let (_, pipeline) = pipeline();

    let outcome = pipeline.ingest_cot(&ScriptedReports, 2019..=2020).await;

    assert_eq!(outcome.report.failures.len(), 1);
    assert_eq!(outcome.report.failures[0].market, "COT 2019");
    assert_eq!(outcome.report.rows_written, 52);
}

#[tokio::test]
async fn test_full_run_raises_alerts_once() {
    let (store, pipeline) = pipeline();
    let config = IngestConfig {
        price_tickers: vec!["GC=F".to_string()],
        price_start: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
        cot_start_year: 2020,
        ..IngestConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();

    let first = pipeline
        .run(&ScriptedPrices, &ScriptedReports, &config, today)
        .await;

    assert!(first.is_clean());
    assert_eq!(first.rows_written, 10 + 3 * 52);
    assert!(first.alerts_created >= 1);

    let gold = store.find_by_name("XAU").await.unwrap().unwrap();
    let history = store.alert_history(gold.id, 10).await.unwrap();
    let max = history
        .iter()
        .find(|a| a.kind == AlertKind::MaxNetLong)
        .unwrap();
    assert_eq!(max.value, 15_500.0);
    assert!(max
        .message
        .starts_with("XAU large speculators are at maximum net long (current: 15500"));

    let second = pipeline
        .run(&ScriptedPrices, &ScriptedReports, &config, today)
        .await;

    assert_eq!(second.rows_written, 0);
    assert_eq!(second.alerts_created, 0);
    assert_eq!(store.alert_count(), first.alerts_created);
}
