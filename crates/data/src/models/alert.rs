//! Positioning alert model.
//!
//! Alerts are append-only. `(market_id, kind, message)` is the dedup key:
//! a message is built deterministically from the values that triggered it,
//! so re-evaluating unchanged history reproduces the same key.

use chrono::{DateTime, Utc};
use positioning_core::{AlertKind, MarketId, PositioningError};
use serde::{Deserialize, Serialize};

/// A persisted alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub market_id: MarketId,
    /// Wall-clock time the alert was generated
    pub timestamp: DateTime<Utc>,
    pub kind: AlertKind,
    pub message: String,
    /// Net position or change that triggered the alert
    pub value: f64,
}

/// An alert that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub market_id: MarketId,
    pub timestamp: DateTime<Utc>,
    pub kind: AlertKind,
    pub message: String,
    pub value: f64,
}

impl NewAlert {
    /// Attaches the store-assigned id.
    #[must_use]
    pub fn into_alert(self, id: i64) -> Alert {
        Alert {
            id,
            market_id: self.market_id,
            timestamp: self.timestamp,
            kind: self.kind,
            message: self.message,
            value: self.value,
        }
    }
}

/// Database row for `alerts`; `kind` is stored as its text tag.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AlertRow {
    pub id: i64,
    pub market_id: MarketId,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub message: String,
    pub value: f64,
}

impl TryFrom<AlertRow> for Alert {
    type Error = PositioningError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            market_id: row.market_id,
            timestamp: row.timestamp,
            kind: row.kind.parse()?,
            message: row.message,
            value: row.value,
        })
    }
}
