//! Price point model.

use chrono::{DateTime, NaiveDate, Utc};
use positioning_core::MarketId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closing price for a market at a timestamp.
///
/// `(market_id, timestamp)` is unique; re-ingesting a timestamp is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PricePoint {
    pub market_id: MarketId,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PricePoint {
    /// Calendar date of the observation (UTC).
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_date_is_utc_calendar_day() {
        let point = PricePoint {
            market_id: 1,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 0).unwrap(),
            price: dec!(2150.4),
        };
        assert_eq!(point.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }
}
