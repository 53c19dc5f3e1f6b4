//! Alert repository.
//!
//! The `alerts_dedup_key` constraint on `(market_id, kind, message)` makes
//! duplicate inserts a no-op at the storage layer.

use positioning_core::{AlertKind, MarketId, Result};
use sqlx::PgPool;

use crate::database::{db_error, sql_limit};
use crate::models::{Alert, AlertRow, NewAlert};

/// Repository for alert operations.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up an alert by its dedup key.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        market_id: MarketId,
        kind: AlertKind,
        message: &str,
    ) -> Result<Option<Alert>> {
        let row = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, market_id, timestamp, kind, message, value
            FROM alerts
            WHERE market_id = $1 AND kind = $2 AND message = $3
            "#,
        )
        .bind(market_id)
        .bind(kind.as_str())
        .bind(message)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Alert::try_from).transpose()
    }

    /// Inserts an alert and returns it, or `None` if the dedup key exists.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown market, or a database error.
    pub async fn insert(&self, alert: &NewAlert) -> Result<Option<Alert>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO alerts (market_id, timestamp, kind, message, value)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (market_id, kind, message) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(alert.market_id)
        .bind(alert.timestamp)
        .bind(alert.kind.as_str())
        .bind(&alert.message)
        .bind(alert.value)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|(id,)| alert.clone().into_alert(id)))
    }

    /// Alert history for a market, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history(&self, market_id: MarketId, limit: usize) -> Result<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(
            r#"
            SELECT id, market_id, timestamp, kind, message, value
            FROM alerts
            WHERE market_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(market_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Alert::try_from).collect()
    }
}
