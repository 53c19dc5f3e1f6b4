//! Price point repository.

use chrono::{DateTime, Utc};
use positioning_core::{MarketId, Result};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::database::db_error;
use crate::models::PricePoint;

/// Repository for price point operations.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    pool: PgPool,
}

impl PriceRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a price point unless the timestamp is already stored.
    ///
    /// Returns true if a row was written.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown market, or a database error.
    pub async fn insert(
        &self,
        market_id: MarketId,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO price_points (market_id, timestamp, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (market_id, timestamp) DO NOTHING
            "#,
        )
        .bind(market_id)
        .bind(timestamp)
        .bind(price)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() == 1)
    }

    /// All prices for a market, ascending by timestamp.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history(&self, market_id: MarketId) -> Result<Vec<PricePoint>> {
        sqlx::query_as::<_, PricePoint>(
            r#"
            SELECT market_id, timestamp, price
            FROM price_points
            WHERE market_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(market_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Prices within a time range, ascending.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_time_range(
        &self,
        market_id: MarketId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        sqlx::query_as::<_, PricePoint>(
            r#"
            SELECT market_id, timestamp, price
            FROM price_points
            WHERE market_id = $1 AND timestamp >= $2 AND timestamp <= $3
            ORDER BY timestamp ASC
            "#,
        )
        .bind(market_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}
