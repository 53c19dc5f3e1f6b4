//! Positioning report repository.
//!
//! Provides idempotent inserts and descending history windows for the
//! alert engine.

use chrono::NaiveDate;
use positioning_core::{MarketId, Result};
use sqlx::PgPool;

use crate::database::{db_error, sql_limit};
use crate::models::{PositionCounts, PositioningReport};

/// Repository for positioning report operations.
#[derive(Debug, Clone)]
pub struct PositioningRepository {
    pool: PgPool,
}

impl PositioningRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a report unless one exists for the same market and date.
    ///
    /// Returns true if a row was written.
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown market, or a database error.
    pub async fn insert(
        &self,
        market_id: MarketId,
        report_date: NaiveDate,
        counts: &PositionCounts,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO positioning_reports
                (market_id, report_date, commercial_long, commercial_short,
                 large_spec_long, large_spec_short, small_spec_long, small_spec_short)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (market_id, report_date) DO NOTHING
            "#,
        )
        .bind(market_id)
        .bind(report_date)
        .bind(counts.commercial_long)
        .bind(counts.commercial_short)
        .bind(counts.large_spec_long)
        .bind(counts.large_spec_short)
        .bind(counts.small_spec_long)
        .bind(counts.small_spec_short)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() == 1)
    }

    /// Most recent reports first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn recent(&self, market_id: MarketId, limit: usize) -> Result<Vec<PositioningReport>> {
        sqlx::query_as::<_, PositioningReport>(
            r#"
            SELECT market_id, report_date, commercial_long, commercial_short,
                   large_spec_long, large_spec_short, small_spec_long, small_spec_short
            FROM positioning_reports
            WHERE market_id = $1
            ORDER BY report_date DESC
            LIMIT $2
            "#,
        )
        .bind(market_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Every report for a market, ascending by date.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn history(&self, market_id: MarketId) -> Result<Vec<PositioningReport>> {
        sqlx::query_as::<_, PositioningReport>(
            r#"
            SELECT market_id, report_date, commercial_long, commercial_short,
                   large_spec_long, large_spec_short, small_spec_long, small_spec_short
            FROM positioning_reports
            WHERE market_id = $1
            ORDER BY report_date ASC
            "#,
        )
        .bind(market_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Number of stored reports for a market.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count(&self, market_id: MarketId) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM positioning_reports WHERE market_id = $1
            "#,
        )
        .bind(market_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_new() {
        assert!(std::mem::size_of::<PositioningRepository>() > 0);
    }
}
