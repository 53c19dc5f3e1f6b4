//! Canonical market and alias models.
//!
//! A [`Market`] is the single deduplicated identity of an instrument.
//! Every external identifier that has ever been seen for it is kept as a
//! [`MarketAlias`], keyed by `(source, source_identifier)`.

use positioning_core::{MarketId, PositioningError, Source};
use serde::{Deserialize, Serialize};

/// A canonical market entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Market {
    /// Store-assigned identifier
    pub id: MarketId,
    /// Canonical name, unique across all markets (e.g., "XAU")
    pub name: String,
    /// Canonical symbol
    pub symbol: String,
    /// Optional classification (e.g., "metals", "energy")
    pub asset_class: Option<String>,
}

/// Attributes of a market that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMarket {
    pub name: String,
    pub symbol: String,
}

impl NewMarket {
    /// Builds the market that `resolve` creates on first sighting.
    ///
    /// The canonical name is used as both name and symbol. A missing or
    /// blank canonical name falls back to the raw source identifier.
    #[must_use]
    pub fn from_identifiers(canonical_name: Option<&str>, source_identifier: &str) -> Self {
        let name = canonical_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(source_identifier)
            .to_string();
        Self {
            symbol: name.clone(),
            name,
        }
    }
}

/// Maps one external identifier to its canonical market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketAlias {
    pub id: i64,
    pub market_id: MarketId,
    pub source: Source,
    pub source_identifier: String,
}

/// Database row for `market_aliases`; `source` is stored as its text tag.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct MarketAliasRow {
    pub id: i64,
    pub market_id: MarketId,
    pub source: String,
    pub source_identifier: String,
}

impl TryFrom<MarketAliasRow> for MarketAlias {
    type Error = PositioningError;

    fn try_from(row: MarketAliasRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            market_id: row.market_id,
            source: row.source.parse()?,
            source_identifier: row.source_identifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_market_uses_canonical_name_for_name_and_symbol() {
        let market = NewMarket::from_identifiers(Some("XAU"), "GOLD - COMMODITY EXCHANGE INC.");
        assert_eq!(market.name, "XAU");
        assert_eq!(market.symbol, "XAU");
    }

    #[test]
    fn test_new_market_falls_back_to_source_identifier() {
        let market = NewMarket::from_identifiers(None, "GC=F");
        assert_eq!(market.name, "GC=F");
        assert_eq!(market.symbol, "GC=F");

        let blank = NewMarket::from_identifiers(Some("  "), "GC=F");
        assert_eq!(blank.name, "GC=F");
    }

    #[test]
    fn test_alias_row_conversion_rejects_unknown_source() {
        let row = MarketAliasRow {
            id: 1,
            market_id: 7,
            source: "yahoo".to_string(),
            source_identifier: "GC=F".to_string(),
        };
        assert!(MarketAlias::try_from(row).is_err());
    }

    #[test]
    fn test_alias_row_conversion() {
        let row = MarketAliasRow {
            id: 1,
            market_id: 7,
            source: "price-vendor".to_string(),
            source_identifier: "GC=F".to_string(),
        };
        let alias = MarketAlias::try_from(row).unwrap();
        assert_eq!(alias.source, Source::PriceVendor);
        assert_eq!(alias.market_id, 7);
    }
}
