//! Market and alias repository.
//!
//! Creation paths use `INSERT ... ON CONFLICT DO NOTHING RETURNING` so the
//! check-then-create step is one atomic statement; a lost race falls back
//! to reading the row the winner wrote.

use positioning_core::{MarketId, PositioningError, Result, Source};
use sqlx::PgPool;

use crate::database::db_error;
use crate::models::{Market, MarketAlias, MarketAliasRow, NewMarket};

/// Repository for `markets` and `market_aliases`.
#[derive(Debug, Clone)]
pub struct MarketRepository {
    pool: PgPool,
}

impl MarketRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up the market bound to an alias.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_alias(
        &self,
        source: Source,
        source_identifier: &str,
    ) -> Result<Option<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT m.id, m.name, m.symbol, m.asset_class
            FROM market_aliases a
            JOIN markets m ON m.id = a.market_id
            WHERE a.source = $1 AND a.source_identifier = $2
            "#,
        )
        .bind(source.as_str())
        .bind(source_identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Exact, case-sensitive lookup on the canonical name.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT id, name, symbol, asset_class
            FROM markets
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Case-insensitive name lookup.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_name_ci(&self, name: &str) -> Result<Option<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT id, name, symbol, asset_class
            FROM markets
            WHERE name ILIKE $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(escape_like(name))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn find_by_symbol(&self, symbol: &str) -> Result<Option<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT id, name, symbol, asset_class
            FROM markets
            WHERE symbol = $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: MarketId) -> Result<Option<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT id, name, symbol, asset_class
            FROM markets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    /// Inserts a market or returns the one that already owns the name.
    ///
    /// # Errors
    /// Returns `Conflict` if the name is taken but the row cannot be read back,
    /// or a database error.
    pub async fn insert_or_fetch(&self, market: &NewMarket) -> Result<Market> {
        let inserted = sqlx::query_as::<_, Market>(
            r#"
            INSERT INTO markets (name, symbol)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, symbol, asset_class
            "#,
        )
        .bind(&market.name)
        .bind(&market.symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(created) = inserted {
            tracing::info!("Created market {} (id {})", created.name, created.id);
            return Ok(created);
        }

        self.find_by_name(&market.name).await?.ok_or_else(|| {
            PositioningError::Conflict(format!("market name '{}' raced on insert", market.name))
        })
    }

    /// Inserts an alias or returns the existing binding for the same identifier.
    ///
    /// # Errors
    /// Returns `NotFound` if the market does not exist, `Conflict` if the alias
    /// cannot be read back after a lost race, or a database error.
    pub async fn insert_or_fetch_alias(
        &self,
        source: Source,
        source_identifier: &str,
        market_id: MarketId,
    ) -> Result<MarketAlias> {
        let inserted = sqlx::query_as::<_, MarketAliasRow>(
            r#"
            INSERT INTO market_aliases (market_id, source, source_identifier)
            VALUES ($1, $2, $3)
            ON CONFLICT (source, source_identifier) DO NOTHING
            RETURNING id, market_id, source, source_identifier
            "#,
        )
        .bind(market_id)
        .bind(source.as_str())
        .bind(source_identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let row = match inserted {
            Some(row) => row,
            None => sqlx::query_as::<_, MarketAliasRow>(
                r#"
                SELECT id, market_id, source, source_identifier
                FROM market_aliases
                WHERE source = $1 AND source_identifier = $2
                "#,
            )
            .bind(source.as_str())
            .bind(source_identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| {
                PositioningError::Conflict(format!(
                    "alias ({source}, {source_identifier}) raced on insert"
                ))
            })?,
        };

        MarketAlias::try_from(row)
    }

    /// # Errors
    /// Returns an error if the database query fails or a stored tag is unknown.
    pub async fn aliases_for(&self, market_id: MarketId) -> Result<Vec<MarketAlias>> {
        let rows = sqlx::query_as::<_, MarketAliasRow>(
            r#"
            SELECT id, market_id, source, source_identifier
            FROM market_aliases
            WHERE market_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(market_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(MarketAlias::try_from).collect()
    }

    /// Sets the asset class of a market.
    ///
    /// # Errors
    /// Returns `NotFound` if the market does not exist.
    pub async fn set_asset_class(&self, market_id: MarketId, asset_class: &str) -> Result<Market> {
        sqlx::query_as::<_, Market>(
            r#"
            UPDATE markets
            SET asset_class = $2
            WHERE id = $1
            RETURNING id, name, symbol, asset_class
            "#,
        )
        .bind(market_id)
        .bind(asset_class)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or_else(|| PositioningError::not_found(format!("market {market_id}")))
    }

    /// Lists all markets ordered by name.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Market>> {
        sqlx::query_as::<_, Market>(
            r#"
            SELECT id, name, symbol, asset_class
            FROM markets
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)
    }
}

/// Escapes `ILIKE` wildcards so the lookup stays an exact (case-insensitive) match.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
