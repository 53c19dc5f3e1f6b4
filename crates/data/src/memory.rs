//! In-process arena store.
//!
//! Markets live in a vector indexed by id; every child collection refers to
//! them by id only. A single mutex guards the whole arena, which makes each
//! trait method one atomic step. Used by tests and dry runs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use positioning_core::{AlertKind, MarketId, PositioningError, Result, Source};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Alert, Market, MarketAlias, NewAlert, NewMarket, PositionCounts, PositioningReport,
    PricePoint,
};
use crate::store::{AlertStore, MarketRegistry, TimeSeriesStore};

#[derive(Debug, Default)]
struct Arena {
    markets: Vec<Market>,
    names: HashMap<String, MarketId>,
    aliases: BTreeMap<(Source, String), MarketAlias>,
    prices: HashMap<MarketId, BTreeMap<DateTime<Utc>, Decimal>>,
    reports: HashMap<MarketId, BTreeMap<NaiveDate, PositionCounts>>,
    alerts: Vec<Alert>,
    alert_keys: HashMap<(MarketId, AlertKind, String), usize>,
}

impl Arena {
    fn market(&self, id: MarketId) -> Option<&Market> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.markets.get(index)
    }

    fn require_market(&self, id: MarketId) -> Result<()> {
        self.market(id)
            .map(|_| ())
            .ok_or_else(|| PositioningError::not_found(format!("market {id}")))
    }
}

/// Thread-safe in-memory implementation of every storage trait.
#[derive(Debug, Default)]
pub struct MemoryMarketStore {
    arena: Mutex<Arena>,
}

impl MemoryMarketStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total alias rows, across all markets.
    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.arena.lock().aliases.len()
    }

    #[must_use]
    pub fn market_count(&self) -> usize {
        self.arena.lock().markets.len()
    }

    #[must_use]
    pub fn price_count(&self, market_id: MarketId) -> usize {
        self.arena
            .lock()
            .prices
            .get(&market_id)
            .map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn report_count(&self, market_id: MarketId) -> usize {
        self.arena
            .lock()
            .reports
            .get(&market_id)
            .map_or(0, BTreeMap::len)
    }

    #[must_use]
    pub fn alert_count(&self) -> usize {
        self.arena.lock().alerts.len()
    }
}

#[async_trait]
impl MarketRegistry for MemoryMarketStore {
    async fn find_by_alias(
        &self,
        source: Source,
        source_identifier: &str,
    ) -> Result<Option<Market>> {
        let arena = self.arena.lock();
        Ok(arena
            .aliases
            .get(&(source, source_identifier.to_string()))
            .and_then(|alias| arena.market(alias.market_id))
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Market>> {
        let arena = self.arena.lock();
        Ok(arena
            .names
            .get(name)
            .and_then(|id| arena.market(*id))
            .cloned())
    }

    async fn get_market(&self, id: MarketId) -> Result<Option<Market>> {
        Ok(self.arena.lock().market(id).cloned())
    }

    async fn insert_or_fetch_market(&self, market: &NewMarket) -> Result<Market> {
        let mut arena = self.arena.lock();
        if let Some(existing) = arena.names.get(&market.name).and_then(|id| arena.market(*id)) {
            return Ok(existing.clone());
        }

        let id = MarketId::try_from(arena.markets.len() + 1)
            .map_err(|_| PositioningError::Database("market id space exhausted".to_string()))?;
        let created = Market {
            id,
            name: market.name.clone(),
            symbol: market.symbol.clone(),
            asset_class: None,
        };
        arena.names.insert(created.name.clone(), id);
        arena.markets.push(created.clone());
        Ok(created)
    }

    async fn insert_or_fetch_alias(
        &self,
        source: Source,
        source_identifier: &str,
        market_id: MarketId,
    ) -> Result<MarketAlias> {
        let mut arena = self.arena.lock();
        arena.require_market(market_id)?;

        let key = (source, source_identifier.to_string());
        if let Some(existing) = arena.aliases.get(&key) {
            return Ok(existing.clone());
        }

        let id = i64::try_from(arena.aliases.len() + 1)
            .map_err(|_| PositioningError::Database("alias id space exhausted".to_string()))?;
        let alias = MarketAlias {
            id,
            market_id,
            source,
            source_identifier: source_identifier.to_string(),
        };
        arena.aliases.insert(key, alias.clone());
        Ok(alias)
    }

    async fn aliases_for(&self, market_id: MarketId) -> Result<Vec<MarketAlias>> {
        let arena = self.arena.lock();
        let mut aliases: Vec<MarketAlias> = arena
            .aliases
            .values()
            .filter(|a| a.market_id == market_id)
            .cloned()
            .collect();
        aliases.sort_by_key(|a| a.id);
        Ok(aliases)
    }

    async fn set_asset_class(&self, market_id: MarketId, asset_class: &str) -> Result<Market> {
        let mut arena = self.arena.lock();
        arena.require_market(market_id)?;
        let index = usize::try_from(market_id - 1)
            .map_err(|_| PositioningError::not_found(format!("market {market_id}")))?;
        let market = &mut arena.markets[index];
        market.asset_class = Some(asset_class.to_string());
        Ok(market.clone())
    }

    async fn list_markets(&self) -> Result<Vec<Market>> {
        let mut markets = self.arena.lock().markets.clone();
        markets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(markets)
    }

    async fn find_by_name_ci(&self, name: &str) -> Result<Option<Market>> {
        let arena = self.arena.lock();
        Ok(arena
            .markets
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Market>> {
        let arena = self.arena.lock();
        Ok(arena.markets.iter().find(|m| m.symbol == symbol).cloned())
    }
}

#[async_trait]
impl TimeSeriesStore for MemoryMarketStore {
    async fn append_price(
        &self,
        market_id: MarketId,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> Result<bool> {
        let mut arena = self.arena.lock();
        arena.require_market(market_id)?;
        let series = arena.prices.entry(market_id).or_default();
        if series.contains_key(&timestamp) {
            return Ok(false);
        }
        series.insert(timestamp, price);
        Ok(true)
    }

    async fn append_report(
        &self,
        market_id: MarketId,
        report_date: NaiveDate,
        counts: &PositionCounts,
    ) -> Result<bool> {
        let mut arena = self.arena.lock();
        arena.require_market(market_id)?;
        let series = arena.reports.entry(market_id).or_default();
        if series.contains_key(&report_date) {
            return Ok(false);
        }
        series.insert(report_date, *counts);
        Ok(true)
    }

    async fn recent_reports(
        &self,
        market_id: MarketId,
        limit: usize,
    ) -> Result<Vec<PositioningReport>> {
        let arena = self.arena.lock();
        Ok(arena
            .reports
            .get(&market_id)
            .map(|series| {
                series
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|(date, counts)| PositioningReport {
                        market_id,
                        report_date: *date,
                        counts: *counts,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn report_history(&self, market_id: MarketId) -> Result<Vec<PositioningReport>> {
        let arena = self.arena.lock();
        Ok(arena
            .reports
            .get(&market_id)
            .map(|series| {
                series
                    .iter()
                    .map(|(date, counts)| PositioningReport {
                        market_id,
                        report_date: *date,
                        counts: *counts,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn price_history(&self, market_id: MarketId) -> Result<Vec<PricePoint>> {
        let arena = self.arena.lock();
        Ok(arena
            .prices
            .get(&market_id)
            .map(|series| {
                series
                    .iter()
                    .map(|(timestamp, price)| PricePoint {
                        market_id,
                        timestamp: *timestamp,
                        price: *price,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl AlertStore for MemoryMarketStore {
    async fn find_alert(
        &self,
        market_id: MarketId,
        kind: AlertKind,
        message: &str,
    ) -> Result<Option<Alert>> {
        let arena = self.arena.lock();
        Ok(arena
            .alert_keys
            .get(&(market_id, kind, message.to_string()))
            .and_then(|index| arena.alerts.get(*index))
            .cloned())
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<Option<Alert>> {
        let mut arena = self.arena.lock();
        arena.require_market(alert.market_id)?;

        let key = (alert.market_id, alert.kind, alert.message.clone());
        if arena.alert_keys.contains_key(&key) {
            return Ok(None);
        }

        let index = arena.alerts.len();
        let id = i64::try_from(index + 1)
            .map_err(|_| PositioningError::Database("alert id space exhausted".to_string()))?;
        let created = alert.clone().into_alert(id);
        arena.alerts.push(created.clone());
        arena.alert_keys.insert(key, index);
        Ok(Some(created))
    }

    async fn alert_history(&self, market_id: MarketId, limit: usize) -> Result<Vec<Alert>> {
        let arena = self.arena.lock();
        let mut alerts: Vec<Alert> = arena
            .alerts
            .iter()
            .filter(|a| a.market_id == market_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        alerts.truncate(limit);
        Ok(alerts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn gold() -> NewMarket {
        NewMarket {
            name: "XAU".to_string(),
            symbol: "XAU".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_or_fetch_market_is_idempotent() {
        let store = MemoryMarketStore::new();
        let first = store.insert_or_fetch_market(&gold()).await.unwrap();
        let second = store.insert_or_fetch_market(&gold()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.market_count(), 1);
    }

    #[tokio::test]
    async fn test_alias_conflict_returns_existing_binding() {
        let store = MemoryMarketStore::new();
        let gold = store.insert_or_fetch_market(&gold()).await.unwrap();
        let other = store
            .insert_or_fetch_market(&NewMarket {
                name: "XAG".to_string(),
                symbol: "XAG".to_string(),
            })
            .await
            .unwrap();

        store
            .insert_or_fetch_alias(Source::PriceVendor, "GC=F", gold.id)
            .await
            .unwrap();
        let raced = store
            .insert_or_fetch_alias(Source::PriceVendor, "GC=F", other.id)
            .await
            .unwrap();

        assert_eq!(raced.market_id, gold.id);
        assert_eq!(store.alias_count(), 1);
    }

    #[tokio::test]
    async fn test_alias_for_unknown_market_is_not_found() {
        let store = MemoryMarketStore::new();
        let err = store
            .insert_or_fetch_alias(Source::Internal, "X", 99)
            .await
            .unwrap_err();
        assert!(matches!(err, PositioningError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_append_price_twice_stores_one_row() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        assert!(store.append_price(market.id, ts, dec!(2300.5)).await.unwrap());
        assert!(!store.append_price(market.id, ts, dec!(2301.0)).await.unwrap());

        assert_eq!(store.price_count(market.id), 1);
        let history = store.price_history(market.id).await.unwrap();
        assert_eq!(history[0].price, dec!(2300.5));
    }

    #[tokio::test]
    async fn test_append_report_twice_stores_one_row() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        let counts = PositionCounts {
            large_spec_long: 200,
            large_spec_short: 50,
            ..PositionCounts::default()
        };

        assert!(store.append_report(market.id, date, &counts).await.unwrap());
        assert!(!store.append_report(market.id, date, &counts).await.unwrap());
        assert_eq!(store.report_count(market.id), 1);
    }

    #[tokio::test]
    async fn test_append_for_unknown_market_is_not_found() {
        let store = MemoryMarketStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let err = store.append_price(7, ts, dec!(1)).await.unwrap_err();
        assert!(matches!(err, PositioningError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_recent_reports_are_newest_first_and_limited() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for week in 0..5 {
            let date = start + chrono::Duration::weeks(week);
            store
                .append_report(market.id, date, &PositionCounts::default())
                .await
                .unwrap();
        }

        let recent = store.recent_reports(market.id, 3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].report_date, start + chrono::Duration::weeks(4));
        assert!(recent[0].report_date > recent[1].report_date);
    }

    #[tokio::test]
    async fn test_duplicate_alert_is_rejected() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        let alert = NewAlert {
            market_id: market.id,
            timestamp: Utc::now(),
            kind: AlertKind::MaxNetLong,
            message: "XAU large speculators are at maximum net long".to_string(),
            value: 10.0,
        };

        assert!(store.insert_alert(&alert).await.unwrap().is_some());
        assert!(store.insert_alert(&alert).await.unwrap().is_none());
        assert_eq!(store.alert_count(), 1);
        assert!(store
            .find_alert(market.id, AlertKind::MaxNetLong, &alert.message)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_alert_history_newest_first() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        for (hour, kind) in [(1, AlertKind::MaxNetLong), (3, AlertKind::RapidChange)] {
            store
                .insert_alert(&NewAlert {
                    market_id: market.id,
                    timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
                    kind,
                    message: format!("alert at {hour}"),
                    value: 1.0,
                })
                .await
                .unwrap();
        }

        let history = store.alert_history(market.id, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, AlertKind::RapidChange);
    }

    #[tokio::test]
    async fn test_set_asset_class_and_lookups() {
        let store = MemoryMarketStore::new();
        let market = store.insert_or_fetch_market(&gold()).await.unwrap();
        let updated = store.set_asset_class(market.id, "metals").await.unwrap();

        assert_eq!(updated.asset_class.as_deref(), Some("metals"));
        assert_eq!(store.find_by_name_ci("xau").await.unwrap().map(|m| m.id), Some(market.id));
        assert!(store.find_by_name("xau").await.unwrap().is_none());
        assert!(store.find_by_symbol("XAU").await.unwrap().is_some());
    }
}
