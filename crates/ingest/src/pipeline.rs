//! Ingestion pipelines.
//!
//! Every market is resolved, written and reported on independently: a
//! failed fetch or a broken market never stops the rest of the run. Markets
//! touched by a run are evaluated by the alert engine at the end.

use chrono::{Datelike, NaiveDate};
use positioning_core::{
    AlertConfig, IngestConfig, MarketId, PositioningError, PositioningFeed, PriceBar, PriceFeed,
    RawCotRow, Result, RunReport, Source,
};
use positioning_data::{Market, MarketResolver, MarketStore, TimeSeriesStore};
use positioning_signals::AlertEngine;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::normalize::{columns, CotRecord};

/// Row counts for one market batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub written: usize,
    /// Rows whose key was already stored.
    pub duplicates: usize,
    /// Malformed rows.
    pub skipped: usize,
}

impl IngestStats {
    fn add_to(self, report: &mut RunReport) {
        report.rows_written += self.written;
        report.rows_skipped += self.duplicates + self.skipped;
    }
}

/// Writes price bars for one market. Bars without a close are skipped.
///
/// # Errors
/// Returns `NotFound` for an unknown market, or a storage error.
pub async fn ingest_price_rows<S>(store: &S, market_id: MarketId, bars: &[PriceBar]) -> Result<IngestStats>
where
    S: TimeSeriesStore + ?Sized,
{
    let mut stats = IngestStats::default();

    for bar in bars {
        let Some(close) = bar.close else {
            warn!("Skipping bar at {} for market {}: no close", bar.timestamp, market_id);
            stats.skipped += 1;
            continue;
        };

        if store.append_price(market_id, bar.timestamp, close).await? {
            stats.written += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    Ok(stats)
}

/// Writes positioning report rows for one market. Malformed rows are
/// skipped and logged; well-formed rows are persisted.
///
/// # Errors
/// Returns `NotFound` for an unknown market, or a storage error.
pub async fn ingest_report_rows<'a, S, I>(store: &S, market_id: MarketId, rows: I) -> Result<IngestStats>
where
    S: TimeSeriesStore + ?Sized,
    I: IntoIterator<Item = &'a RawCotRow>,
{
    let mut stats = IngestStats::default();

    for row in rows {
        let record = match CotRecord::try_from(row) {
            Ok(record) => record,
            Err(err) => {
                warn!("Skipping report row for market {}: {}", market_id, err);
                stats.skipped += 1;
                continue;
            }
        };

        if store
            .append_report(market_id, record.report_date, &record.counts)
            .await?
        {
            stats.written += 1;
        } else {
            stats.duplicates += 1;
        }
    }

    Ok(stats)
}

/// Report of a run plus the markets it wrote to.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub report: RunReport,
    pub markets: BTreeSet<MarketId>,
}

impl RunOutcome {
    pub fn merge(&mut self, other: RunOutcome) {
        self.report.merge(other.report);
        self.markets.extend(other.markets);
    }
}

/// Resolves, stores and evaluates vendor data.
pub struct IngestPipeline<S: ?Sized> {
    store: Arc<S>,
    resolver: MarketResolver<S>,
    alerts: AlertEngine<S>,
}

impl<S: MarketStore + ?Sized> IngestPipeline<S> {
    #[must_use]
    pub fn new(store: Arc<S>, alert_config: AlertConfig) -> Self {
        Self {
            resolver: MarketResolver::new(Arc::clone(&store)),
            alerts: AlertEngine::new(Arc::clone(&store), alert_config),
            store,
        }
    }

    #[must_use]
    pub fn alerts(&self) -> &AlertEngine<S> {
        &self.alerts
    }

    /// Fetches and stores daily closes for each ticker.
    pub async fn ingest_prices(
        &self,
        feed: &dyn PriceFeed,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        for ticker in tickers {
            match self.ingest_ticker(feed, ticker, start, end).await {
                Ok((market_id, stats)) => {
                    info!("Stored {} rows for {}", stats.written, ticker);
                    outcome.report.markets_processed += 1;
                    stats.add_to(&mut outcome.report);
                    outcome.markets.insert(market_id);
                }
                Err(err) => {
                    error!("Skipping {} ({}): {}", ticker, feed.name(), err);
                    outcome.report.record_failure(ticker.clone(), err);
                }
            }
        }

        outcome
    }

    async fn ingest_ticker(
        &self,
        feed: &dyn PriceFeed,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(MarketId, IngestStats)> {
        let bars = feed.fetch_closes(ticker, start, end).await?;
        let market = self.resolver.resolve_mapped(Source::PriceVendor, ticker).await?;
        let stats = ingest_price_rows(self.store.as_ref(), market.id, &bars).await?;
        Ok((market.id, stats))
    }

    /// Fetches and stores one year of positioning reports.
    pub async fn ingest_cot_year(&self, feed: &dyn PositioningFeed, year: i32) -> RunOutcome {
        let mut outcome = RunOutcome::default();

        let year_rows = match feed.fetch_year(year).await {
            Ok(year_rows) => year_rows,
            Err(err) => {
                error!("Skipping COT {} ({}): {}", year, feed.name(), err);
                outcome.report.record_failure(format!("COT {year}"), err);
                return outcome;
            }
        };

        outcome.report.rows_skipped += year_rows.skipped;

        let mut by_market: BTreeMap<&str, Vec<&RawCotRow>> = BTreeMap::new();
        for row in &year_rows.rows {
            match row.get(columns::MARKET_NAME) {
                Some(name) => by_market.entry(name).or_default().push(row),
                None => {
                    warn!("Skipping COT {} row without {}", year, columns::MARKET_NAME);
                    outcome.report.rows_skipped += 1;
                }
            }
        }

        for (name, market_rows) in by_market {
            let result = async {
                let market = self
                    .resolver
                    .resolve_mapped(Source::PositioningReport, name)
                    .await?;
                let stats =
                    ingest_report_rows(self.store.as_ref(), market.id, market_rows.iter().copied())
                        .await?;
                Ok::<_, PositioningError>((market, stats))
            }
            .await;

            match result {
                Ok((market, stats)) => {
                    info!("Stored {} rows for {}", stats.written, name);
                    outcome.report.markets_processed += 1;
                    stats.add_to(&mut outcome.report);
                    outcome.markets.insert(market.id);
                    self.bind_contract_code(&market, &market_rows).await;
                }
                Err(err) => {
                    error!("Skipping {}: {}", name, err);
                    outcome.report.record_failure(name, err);
                }
            }
        }

        outcome
    }

    /// Records the exchange contract code of a report market as an internal
    /// alias. A failure here leaves the stored reports untouched.
    async fn bind_contract_code(&self, market: &Market, rows: &[&RawCotRow]) {
        let Some(code) = rows
            .iter()
            .find_map(|row| CotRecord::try_from(*row).ok())
            .and_then(|record| record.contract_code)
        else {
            return;
        };

        match self
            .resolver
            .resolve(Source::Internal, &code, Some(&market.name))
            .await
        {
            Ok(bound) if bound.id != market.id => warn!(
                "Contract code {} for {} is already bound to {}",
                code, market.name, bound.name
            ),
            Ok(_) => {}
            Err(err) => warn!(
                "Could not bind contract code {} for {}: {}",
                code, market.name, err
            ),
        }
    }

    /// Ingests each year in turn.
    pub async fn ingest_cot(
        &self,
        feed: &dyn PositioningFeed,
        years: RangeInclusive<i32>,
    ) -> RunOutcome {
        let mut outcome = RunOutcome::default();
        for year in years {
            info!("Ingesting COT data for {}", year);
            outcome.merge(self.ingest_cot_year(feed, year).await);
        }
        outcome
    }

    /// Evaluates the given markets and folds the result into `outcome`.
    pub async fn evaluate(&self, outcome: &mut RunOutcome) {
        let market_ids: Vec<MarketId> = outcome.markets.iter().copied().collect();
        let alerts = self.alerts.evaluate_all(&market_ids).await;
        outcome.report.alerts_created += alerts.alerts_created;
        outcome.report.failures.extend(alerts.failures);
    }

    /// Full batch: prices, then every COT year up to `today`, then alert
    /// evaluation of every market touched.
    pub async fn run(
        &self,
        prices: &dyn PriceFeed,
        reports: &dyn PositioningFeed,
        config: &IngestConfig,
        today: NaiveDate,
    ) -> RunReport {
        let mut outcome = self
            .ingest_prices(prices, &config.price_tickers, config.price_start, today)
            .await;
        outcome.merge(
            self.ingest_cot(reports, config.cot_start_year..=today.year())
                .await,
        );
        self.evaluate(&mut outcome).await;

        info!("Run finished: {}", outcome.report);
        outcome.report
    }
}
