//! Ingestion commands: `ingest-prices`, `ingest-cot` and `run`.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use clap::Args;
use positioning_core::AppConfig;
use positioning_ingest::{CftcPositioningFeed, IngestPipeline, YahooPriceFeed};

use super::{print_report, with_store};

/// Arguments for the ingest-prices command.
#[derive(Args, Debug, Clone)]
pub struct IngestPricesArgs {
    /// Vendor tickers to fetch (defaults to the configured list)
    #[arg(long = "ticker")]
    pub tickers: Vec<String>,

    /// First date to fetch, YYYY-MM-DD (defaults to the configured start)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to fetch, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Skip alert evaluation after ingesting
    #[arg(long)]
    pub no_alerts: bool,
}

/// Arguments for the ingest-cot command.
#[derive(Args, Debug, Clone)]
pub struct IngestCotArgs {
    /// First report year (defaults to the configured start year)
    #[arg(long)]
    pub from_year: Option<i32>,

    /// Last report year (defaults to the current year)
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Skip alert evaluation after ingesting
    #[arg(long)]
    pub no_alerts: bool,
}

/// Runs the ingest-prices command.
///
/// # Errors
/// Returns an error if the database or the HTTP client cannot be set up.
pub async fn run_ingest_prices(config: &AppConfig, args: IngestPricesArgs) -> Result<()> {
    let ingest = &config.ingest;
    let feed = YahooPriceFeed::new(
        &ingest.yahoo_base_url,
        ingest.request_timeout_secs,
        ingest.retry.clone(),
    )?;
    let tickers = if args.tickers.is_empty() {
        ingest.price_tickers.clone()
    } else {
        args.tickers
    };
    let no_alerts = args.no_alerts;
    let start = args.start.unwrap_or(ingest.price_start);
    let end = args.end.unwrap_or_else(|| Utc::now().date_naive());

    tracing::info!(
        "Ingesting prices for {} tickers from {} to {}",
        tickers.len(),
        start,
        end
    );

    with_store(config, |store| async move {
        let pipeline = IngestPipeline::new(store, config.alerts.clone());
        let mut outcome = pipeline.ingest_prices(&feed, &tickers, start, end).await;
        if !no_alerts {
            pipeline.evaluate(&mut outcome).await;
        }
        print_report(&outcome.report);
        Ok(())
    })
    .await
}

/// Runs the ingest-cot command.
///
/// # Errors
/// Returns an error if the database or the HTTP client cannot be set up.
pub async fn run_ingest_cot(config: &AppConfig, args: IngestCotArgs) -> Result<()> {
    let ingest = &config.ingest;
    let feed = CftcPositioningFeed::new(
        &ingest.cftc_base_url,
        ingest.request_timeout_secs,
        ingest.retry.clone(),
    )?;
    let from = args.from_year.unwrap_or(ingest.cot_start_year);
    let to = args.to_year.unwrap_or_else(|| Utc::now().year());
    let no_alerts = args.no_alerts;

    with_store(config, |store| async move {
        let pipeline = IngestPipeline::new(store, config.alerts.clone());
        let mut outcome = pipeline.ingest_cot(&feed, from..=to).await;
        if !no_alerts {
            pipeline.evaluate(&mut outcome).await;
        }
        print_report(&outcome.report);
        Ok(())
    })
    .await
}

/// Runs prices, every COT year and alert evaluation in one batch.
///
/// # Errors
/// Returns an error if the database or the HTTP clients cannot be set up.
pub async fn run_full(config: &AppConfig) -> Result<()> {
    let ingest = &config.ingest;
    let prices = YahooPriceFeed::new(
        &ingest.yahoo_base_url,
        ingest.request_timeout_secs,
        ingest.retry.clone(),
    )?;
    let reports = CftcPositioningFeed::new(
        &ingest.cftc_base_url,
        ingest.request_timeout_secs,
        ingest.retry.clone(),
    )?;
    let today = Utc::now().date_naive();

    with_store(config, |store| async move {
        let pipeline = IngestPipeline::new(store, config.alerts.clone());
        let report = pipeline.run(&prices, &reports, ingest, today).await;
        print_report(&report);
        Ok(())
    })
    .await
}
