//! CLI commands for the positioning watch system.

pub mod evaluate;
pub mod ingest;
pub mod query;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use ingest::{run_full, run_ingest_cot, run_ingest_prices, IngestCotArgs, IngestPricesArgs};
pub use query::{run_alerts, run_markets, run_series, AlertsArgs, SeriesArgs};

use anyhow::{bail, Result};
use positioning_core::{AppConfig, RunReport};
use positioning_data::{DatabaseClient, Market, MarketRegistry, Repositories};
use std::future::Future;
use std::sync::Arc;

/// Opens the pool, runs `work` against the Postgres store and closes the
/// pool whatever the outcome.
pub async fn with_store<F, Fut, T>(config: &AppConfig, work: F) -> Result<T>
where
    F: FnOnce(Arc<Repositories>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let db = DatabaseClient::connect(&config.database).await?;
    let result = work(Arc::new(db.repositories())).await;
    db.close().await;
    result
}

/// Finds a market by name (case-insensitive) or by canonical symbol.
pub async fn find_market<S: MarketRegistry + ?Sized>(store: &S, query: &str) -> Result<Market> {
    if let Some(market) = store.find_by_name_ci(query).await? {
        return Ok(market);
    }
    if let Some(market) = store.find_by_symbol(query).await? {
        return Ok(market);
    }
    bail!("market '{}' not found", query)
}

/// Prints the run summary and every per-market failure.
pub fn print_report(report: &RunReport) {
    println!("{report}");
    for failure in &report.failures {
        println!("  failed: {failure}");
    }
}
