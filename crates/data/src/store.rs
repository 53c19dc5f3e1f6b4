//! Storage seams used by the resolver, the ingestion pipelines and the alert engine.
//!
//! Every check-then-create path is a single atomic operation behind these
//! traits, so implementations stay correct when independent markets are
//! processed concurrently.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use positioning_core::{AlertKind, MarketId, Result, Source};
use rust_decimal::Decimal;

use crate::models::{
    merge_series, Alert, Market, MarketAlias, NewAlert, NewMarket, PositionCounts,
    PositioningReport, PricePoint, SeriesPoint,
};

/// Markets and their aliases.
#[async_trait]
pub trait MarketRegistry: Send + Sync {
    /// Returns the market bound to `(source, source_identifier)`, if any.
    async fn find_by_alias(
        &self,
        source: Source,
        source_identifier: &str,
    ) -> Result<Option<Market>>;

    /// Exact, case-sensitive lookup on the canonical name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Market>>;

    async fn get_market(&self, id: MarketId) -> Result<Option<Market>>;

    /// Inserts the market, or returns the existing one with the same name.
    async fn insert_or_fetch_market(&self, market: &NewMarket) -> Result<Market>;

    /// Inserts the alias, or returns the alias already bound to `(source, source_identifier)`.
    ///
    /// The returned alias may point at a different market than `market_id`
    /// when another writer won the race; callers must honour it.
    async fn insert_or_fetch_alias(
        &self,
        source: Source,
        source_identifier: &str,
        market_id: MarketId,
    ) -> Result<MarketAlias>;

    async fn aliases_for(&self, market_id: MarketId) -> Result<Vec<MarketAlias>>;

    /// Adds classification metadata; the only mutation a market allows.
    async fn set_asset_class(&self, market_id: MarketId, asset_class: &str) -> Result<Market>;

    /// All markets ordered by name.
    async fn list_markets(&self) -> Result<Vec<Market>>;

    /// Case-insensitive name lookup used by the read API.
    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Market>>;

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Market>>;
}

/// Append-only price and positioning history.
#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    /// Returns true if a new row was written; an existing timestamp is a no-op.
    async fn append_price(
        &self,
        market_id: MarketId,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> Result<bool>;

    /// Returns true if a new row was written; an existing report date is a no-op.
    async fn append_report(
        &self,
        market_id: MarketId,
        report_date: NaiveDate,
        counts: &PositionCounts,
    ) -> Result<bool>;

    /// Most recent reports first, at most `limit`.
    async fn recent_reports(
        &self,
        market_id: MarketId,
        limit: usize,
    ) -> Result<Vec<PositioningReport>>;

    /// Every report, ascending by date.
    async fn report_history(&self, market_id: MarketId) -> Result<Vec<PositioningReport>>;

    /// Every price point, ascending by timestamp.
    async fn price_history(&self, market_id: MarketId) -> Result<Vec<PricePoint>>;

    /// Prices and reports joined by calendar date, ascending.
    async fn merged_series(&self, market_id: MarketId) -> Result<Vec<SeriesPoint>> {
        let prices = self.price_history(market_id).await?;
        let reports = self.report_history(market_id).await?;
        Ok(merge_series(&prices, &reports))
    }
}

/// Deduplicated alert log.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn find_alert(
        &self,
        market_id: MarketId,
        kind: AlertKind,
        message: &str,
    ) -> Result<Option<Alert>>;

    /// Persists the alert unless `(market_id, kind, message)` already exists.
    ///
    /// Returns `None` when the dedup key was already taken.
    async fn insert_alert(&self, alert: &NewAlert) -> Result<Option<Alert>>;

    /// Newest first, at most `limit`.
    async fn alert_history(&self, market_id: MarketId, limit: usize) -> Result<Vec<Alert>>;
}

/// Full storage surface.
pub trait MarketStore: MarketRegistry + TimeSeriesStore + AlertStore {}

impl<T> MarketStore for T where T: MarketRegistry + TimeSeriesStore + AlertStore {}
