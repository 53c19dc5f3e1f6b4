//! Commitments-of-Traders positioning report model.
//!
//! Reports are published weekly. Each one carries long and short contract
//! counts for three trader categories: commercials (hedgers), large
//! speculators (non-commercial reportable) and small speculators
//! (non-reportable).

use chrono::NaiveDate;
use positioning_core::MarketId;
use serde::{Deserialize, Serialize};

/// Long/short contract counts per trader category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PositionCounts {
    pub commercial_long: i64,
    pub commercial_short: i64,
    pub large_spec_long: i64,
    pub large_spec_short: i64,
    pub small_spec_long: i64,
    pub small_spec_short: i64,
}

impl PositionCounts {
    /// Net position of large speculators (long minus short).
    #[must_use]
    pub fn large_spec_net(&self) -> i64 {
        self.large_spec_long - self.large_spec_short
    }

    #[must_use]
    pub fn commercial_net(&self) -> i64 {
        self.commercial_long - self.commercial_short
    }

    #[must_use]
    pub fn small_spec_net(&self) -> i64 {
        self.small_spec_long - self.small_spec_short
    }
}

/// One weekly report for a market. `(market_id, report_date)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PositioningReport {
    pub market_id: MarketId,
    pub report_date: NaiveDate,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub counts: PositionCounts,
}

impl PositioningReport {
    #[must_use]
    pub fn large_spec_net(&self) -> i64 {
        self.counts.large_spec_net()
    }
}
