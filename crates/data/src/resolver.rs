//! Identity resolution.
//!
//! Collapses `(source, source_identifier)` pairs onto one canonical
//! [`Market`]. An existing alias is authoritative and short-circuits every
//! other lookup. Otherwise the canonical name decides: identifiers from
//! different sources that share a canonical name end up on the same market.

use positioning_core::{PositioningError, Result, Source};
use std::sync::Arc;
use tracing::debug;

use crate::mapping;
use crate::models::{Market, NewMarket};
use crate::store::MarketRegistry;

/// Attempts made before a persistent creation conflict is surfaced.
const MAX_RESOLVE_ATTEMPTS: u32 = 3;

/// Resolves external identifiers to canonical markets.
pub struct MarketResolver<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for MarketResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MarketRegistry + ?Sized> MarketResolver<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the canonical market for an external identifier, creating the
    /// market and alias on first sighting.
    ///
    /// Idempotent: repeated or concurrent calls with the same inputs return
    /// the same market and leave exactly one alias row.
    ///
    /// # Errors
    /// Returns `Validation` for a blank identifier, `Conflict` if creation kept
    /// racing after retries, or a storage error.
    pub async fn resolve(
        &self,
        source: Source,
        source_identifier: &str,
        canonical_name: Option<&str>,
    ) -> Result<Market> {
        let source_identifier = source_identifier.trim();
        if source_identifier.is_empty() {
            return Err(PositioningError::validation(format!(
                "empty {source} identifier"
            )));
        }

        let mut last_conflict = String::new();
        for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
            match self
                .try_resolve(source, source_identifier, canonical_name)
                .await
            {
                Err(PositioningError::Conflict(reason)) => {
                    debug!(
                        "Conflict resolving {} '{}' (attempt {}): {}",
                        source, source_identifier, attempt, reason
                    );
                    last_conflict = reason;
                }
                other => return other,
            }
        }

        Err(PositioningError::Conflict(last_conflict))
    }

    /// Resolves using the static mapping tables to find the canonical name,
    /// and tags newly seen markets with their asset class.
    ///
    /// # Errors
    /// Same as [`MarketResolver::resolve`].
    pub async fn resolve_mapped(&self, source: Source, source_identifier: &str) -> Result<Market> {
        let canonical = mapping::canonical_symbol(source, source_identifier);
        let market = self.resolve(source, source_identifier, canonical).await?;

        if market.asset_class.is_none() {
            if let Some(class) = mapping::asset_class(&market.symbol) {
                return self.store.set_asset_class(market.id, class).await;
            }
        }
        Ok(market)
    }

    async fn try_resolve(
        &self,
        source: Source,
        source_identifier: &str,
        canonical_name: Option<&str>,
    ) -> Result<Market> {
        if let Some(market) = self.store.find_by_alias(source, source_identifier).await? {
            return Ok(market);
        }

        let candidate = NewMarket::from_identifiers(canonical_name, source_identifier);
        let market = match self.store.find_by_name(&candidate.name).await? {
            Some(existing) => existing,
            None => self.store.insert_or_fetch_market(&candidate).await?,
        };

        let alias = self
            .store
            .insert_or_fetch_alias(source, source_identifier, market.id)
            .await?;

        if alias.market_id == market.id {
            debug!(
                "Bound {} '{}' to market {} (id {})",
                source, source_identifier, market.name, market.id
            );
            return Ok(market);
        }

        // Another writer bound this identifier first.
        self.store
            .get_market(alias.market_id)
            .await?
            .ok_or_else(|| {
                PositioningError::Conflict(format!(
                    "alias ({source}, {source_identifier}) points at missing market {}",
                    alias.market_id
                ))
            })
    }
}
