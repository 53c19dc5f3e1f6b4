use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One daily bar from a price vendor. Vendors may omit the close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: Option<Decimal>,
}

/// One positioning report row keyed by normalized column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCotRow {
    pub fields: HashMap<String, String>,
}

impl RawCotRow {
    /// Returns the trimmed value of a column, treating blanks as missing.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }
}

/// Rows decoded from one yearly report archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CotYear {
    pub rows: Vec<RawCotRow>,
    /// Records the decoder could not read.
    pub skipped: usize,
}

impl From<Vec<RawCotRow>> for CotYear {
    fn from(rows: Vec<RawCotRow>) -> Self {
        Self { rows, skipped: 0 }
    }
}

#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetches daily closes for `ticker` between `start` and `end`.
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait PositioningFeed: Send + Sync {
    /// Fetches every report row published for a calendar year.
    async fn fetch_year(&self, year: i32) -> Result<CotYear>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_get_trims_and_drops_blanks() {
        let mut row = RawCotRow::default();
        row.insert("Market_and_Exchange_Names", "  GOLD - COMMODITY EXCHANGE INC.  ");
        row.insert("CFTC_Contract_Market_Code", "   ");

        assert_eq!(
            row.get("Market_and_Exchange_Names"),
            Some("GOLD - COMMODITY EXCHANGE INC.")
        );
        assert_eq!(row.get("CFTC_Contract_Market_Code"), None);
        assert_eq!(row.get("missing"), None);
    }
}
