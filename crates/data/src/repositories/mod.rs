//! Postgres repositories.
//!
//! Each repository provides typed access to one table. [`Repositories`]
//! bundles them over a single pool and implements the storage traits.

pub mod alert_repo;
pub mod market_repo;
pub mod positioning_repo;
pub mod price_repo;

pub use alert_repo::AlertRepository;
pub use market_repo::MarketRepository;
pub use positioning_repo::PositioningRepository;
pub use price_repo::PriceRepository;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use positioning_core::{AlertKind, MarketId, Result, Source};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{
    Alert, Market, MarketAlias, NewAlert, NewMarket, PositionCounts, PositioningReport,
    PricePoint,
};
use crate::store::{AlertStore, MarketRegistry, TimeSeriesStore};

/// Creates all repositories from a single database pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub markets: MarketRepository,
    pub prices: PriceRepository,
    pub reports: PositioningRepository,
    pub alerts: AlertRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            markets: MarketRepository::new(pool.clone()),
            prices: PriceRepository::new(pool.clone()),
            reports: PositioningRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool),
        }
    }
}

#[async_trait]
impl MarketRegistry for Repositories {
    async fn find_by_alias(
        &self,
        source: Source,
        source_identifier: &str,
    ) -> Result<Option<Market>> {
        self.markets.find_by_alias(source, source_identifier).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Market>> {
        self.markets.find_by_name(name).await
    }

    async fn get_market(&self, id: MarketId) -> Result<Option<Market>> {
        self.markets.get(id).await
    }

    async fn insert_or_fetch_market(&self, market: &NewMarket) -> Result<Market> {
        self.markets.insert_or_fetch(market).await
    }

    async fn insert_or_fetch_alias(
        &self,
        source: Source,
        source_identifier: &str,
        market_id: MarketId,
    ) -> Result<MarketAlias> {
        self.markets
            .insert_or_fetch_alias(source, source_identifier, market_id)
            .await
    }

    async fn aliases_for(&self, market_id: MarketId) -> Result<Vec<MarketAlias>> {
        self.markets.aliases_for(market_id).await
    }

    async fn set_asset_class(&self, market_id: MarketId, asset_class: &str) -> Result<Market> {
        self.markets.set_asset_class(market_id, asset_class).await
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        self.markets.list().await
    }

    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Market>> {
        self.markets.find_by_name_ci(name).await
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Market>> {
        self.markets.find_by_symbol(symbol).await
    }
}

#[async_trait]
impl TimeSeriesStore for Repositories {
    async fn append_price(
        &self,
        market_id: MarketId,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> Result<bool> {
        self.prices.insert(market_id, timestamp, price).await
    }

    async fn append_report(
        &self,
        market_id: MarketId,
        report_date: NaiveDate,
        counts: &PositionCounts,
    ) -> Result<bool> {
        self.reports.insert(market_id, report_date, counts).await
    }

    async fn recent_reports(
        &self,
        market_id: MarketId,
        limit: usize,
    ) -> Result<Vec<PositioningReport>> {
        self.reports.recent(market_id, limit).await
    }

    async fn report_history(&self, market_id: MarketId) -> Result<Vec<PositioningReport>> {
        self.reports.history(market_id).await
    }

    async fn price_history(&self, market_id: MarketId) -> Result<Vec<PricePoint>> {
        self.prices.history(market_id).await
    }
}

#[async_trait]
impl AlertStore for Repositories {
    async fn find_alert(
        &self,
        market_id: MarketId,
        kind: AlertKind,
        message: &str,
    ) -> Result<Option<Alert>> {
        self.alerts.find(market_id, kind, message).await
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<Option<Alert>> {
        self.alerts.insert(alert).await
    }

    async fn alert_history(&self, market_id: MarketId, limit: usize) -> Result<Vec<Alert>> {
        self.alerts.history(market_id, limit).await
    }
}
