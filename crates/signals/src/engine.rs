//! Alert engine.
//!
//! Loads the trailing report window for a market, runs the positioning
//! signal and persists every candidate whose `(market_id, kind, message)`
//! key has not been seen before. Re-evaluating unchanged history creates
//! nothing.

use chrono::Utc;
use positioning_core::{AlertConfig, MarketId, PositioningError, Result, RunReport};
use positioning_data::{Alert, AlertStore, MarketRegistry, NewAlert, TimeSeriesStore};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::generator::{CandidateAlert, PositioningSignal};

/// Evaluates markets and records deduplicated alerts.
pub struct AlertEngine<S: ?Sized> {
    store: Arc<S>,
    signal: PositioningSignal,
}

impl<S> AlertEngine<S>
where
    S: MarketRegistry + TimeSeriesStore + AlertStore + ?Sized,
{
    #[must_use]
    pub fn new(store: Arc<S>, config: AlertConfig) -> Self {
        Self {
            store,
            signal: PositioningSignal::new(config),
        }
    }

    /// Evaluates one market and returns the alerts created by this call.
    ///
    /// Fewer than `min_history` reports is not an error: the result is empty.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown market, or a storage error.
    pub async fn evaluate(&self, market_id: MarketId) -> Result<Vec<Alert>> {
        let market = self
            .store
            .get_market(market_id)
            .await?
            .ok_or_else(|| PositioningError::not_found(format!("market {market_id}")))?;

        let history = self
            .store
            .recent_reports(market_id, self.signal.config().window)
            .await?;

        let candidates = match self.signal.generate(&market.name, &history) {
            Ok(candidates) => candidates,
            Err(err) if err.is_soft() => {
                debug!("Skipping {}: {}", market.name, err);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let now = Utc::now();
        let mut created = Vec::new();
        for candidate in candidates {
            if let Some(alert) = self.persist(market_id, candidate, now).await? {
                info!("New alert for {}: {}", market.name, alert.message);
                created.push(alert);
            }
        }

        Ok(created)
    }

    /// Evaluates each market in turn. Failures are recorded per market and
    /// never stop the run.
    pub async fn evaluate_all(&self, market_ids: &[MarketId]) -> RunReport {
        let mut report = RunReport::new();

        for &market_id in market_ids {
            match self.evaluate(market_id).await {
                Ok(alerts) => {
                    report.markets_processed += 1;
                    report.alerts_created += alerts.len();
                }
                Err(err) => {
                    if err.is_surfaced() {
                        warn!("Skipping market {}: {}", market_id, err);
                    } else {
                        error!("Failed to evaluate market {}: {}", market_id, err);
                    }
                    report.record_failure(format!("market {market_id}"), err);
                }
            }
        }

        info!("Alert evaluation finished: {}", report);
        report
    }

    async fn persist(
        &self,
        market_id: MarketId,
        candidate: CandidateAlert,
        timestamp: chrono::DateTime<Utc>,
    ) -> Result<Option<Alert>> {
        if self
            .store
            .find_alert(market_id, candidate.kind, &candidate.message)
            .await?
            .is_some()
        {
            debug!("Duplicate alert discarded: {}", candidate.message);
            return Ok(None);
        }

        let alert = NewAlert {
            market_id,
            timestamp,
            kind: candidate.kind,
            message: candidate.message,
            value: candidate.value,
        };

        match self.store.insert_alert(&alert).await {
            Ok(Some(stored)) => Ok(Some(stored)),
            // Lost a race with a concurrent evaluation of the same market.
            Ok(None) | Err(PositioningError::Conflict(_)) => {
                debug!("Duplicate alert discarded: {}", alert.message);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use positioning_core::{AlertKind, Source};
    use positioning_data::{MarketResolver, MemoryMarketStore, PositionCounts};

    async fn seeded_market(
        store: &Arc<MemoryMarketStore>,
        name: &str,
        nets_oldest_first: &[i64],
    ) -> MarketId {
        let market = MarketResolver::new(Arc::clone(store))
            .resolve(Source::Internal, name, Some(name))
            .await
            .unwrap();

        let start = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap();
        for (i, net) in nets_oldest_first.iter().enumerate() {
            let counts = PositionCounts {
                large_spec_long: 10_000 + net,
                large_spec_short: 10_000,
                ..PositionCounts::default()
            };
            store
                .append_report(market.id, start + Duration::weeks(i as i64), &counts)
                .await
                .unwrap();
        }
        market.id
    }

    fn engine(store: &Arc<MemoryMarketStore>) -> AlertEngine<MemoryMarketStore> {
        AlertEngine::new(Arc::clone(store), AlertConfig::default())
    }

    #[tokio::test]
    async fn test_latest_maximum_creates_max_net_long() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..150).map(|i| i * 10).collect();
        let id = seeded_market(&store, "XAU", &nets).await;

        let alerts = engine(&store).evaluate(id).await.unwrap();

        let max = alerts
            .iter()
            .find(|a| a.kind == AlertKind::MaxNetLong)
            .unwrap();
        assert_eq!(max.market_id, id);
        assert_eq!(max.value, 1490.0);
        // rank 0.9 * 149 = 134.1 -> 1341
        assert!(max.message.contains("90th percentile: 1341"));
    }

    #[tokio::test]
    async fn test_ramp_history_matches_interpolated_percentile() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..100).map(|i| 10 + 2 * i).collect();
        let id = seeded_market(&store, "XAU", &nets).await;

        let alerts = engine(&store).evaluate(id).await.unwrap();

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::MaxNetLong);
        assert_eq!(alerts[0].value, 208.0);
        assert!(alerts[0].message.contains("90th percentile: 188"));
    }

    #[tokio::test]
    async fn test_short_history_yields_no_alerts() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..50).map(|i| i * 100).collect();
        let id = seeded_market(&store, "XAG", &nets).await;

        let alerts = engine(&store).evaluate(id).await.unwrap();

        assert!(alerts.is_empty());
        assert_eq!(store.alert_count(), 0);
    }

    #[tokio::test]
    async fn test_second_evaluation_creates_nothing() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..150).map(|i| i * 10).collect();
        let id = seeded_market(&store, "XAU", &nets).await;
        let engine = engine(&store);

        let first = engine.evaluate(id).await.unwrap();
        let second = engine.evaluate(id).await.unwrap();

        assert!(!first.is_empty());
        assert!(second.is_empty());
        assert_eq!(store.alert_count(), first.len());
    }

    #[tokio::test]
    async fn test_unknown_market_is_not_found() {
        let store = Arc::new(MemoryMarketStore::new());
        let err = engine(&store).evaluate(999).await.unwrap_err();
        assert!(matches!(err, PositioningError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_new_report_produces_new_alert() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..150).map(|i| i * 10).collect();
        let id = seeded_market(&store, "XAU", &nets).await;
        let engine = engine(&store);
        engine.evaluate(id).await.unwrap();

        let next_week = NaiveDate::from_ymd_opt(2021, 1, 5).unwrap() + Duration::weeks(150);
        let counts = PositionCounts {
            large_spec_long: 12_000,
            large_spec_short: 10_000,
            ..PositionCounts::default()
        };
        store.append_report(id, next_week, &counts).await.unwrap();

        let alerts = engine.evaluate(id).await.unwrap();
        assert!(alerts
            .iter()
            .any(|a| a.kind == AlertKind::MaxNetLong && a.value == 2000.0));
    }

    #[tokio::test]
    async fn test_evaluate_all_records_failures_and_continues() {
        let store = Arc::new(MemoryMarketStore::new());
        let nets: Vec<i64> = (0..150).map(|i| i * 10).collect();
        let id = seeded_market(&store, "XAU", &nets).await;

        let report = engine(&store).evaluate_all(&[999, id]).await;

        assert_eq!(report.markets_processed, 1);
        assert!(report.alerts_created >= 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].market, "market 999");
        assert!(matches!(
            report.failures[0].error,
            PositioningError::NotFound { .. }
        ));
    }
}
