//! Enumerated tags shared between storage, alerting and ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PositioningError;

/// Identifier assigned to a canonical market by the store.
pub type MarketId = i64;

/// External source that supplied an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Regulatory Commitments-of-Traders report (verbose exchange names).
    PositioningReport,
    /// Market-data vendor tickers.
    PriceVendor,
    /// Internal canonical codes.
    Internal,
}

impl Source {
    /// Returns the tag stored in the `market_aliases.source` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PositioningReport => "positioning-report",
            Source::PriceVendor => "price-vendor",
            Source::Internal => "internal",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = PositioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positioning-report" => Ok(Source::PositioningReport),
            "price-vendor" => Ok(Source::PriceVendor),
            "internal" => Ok(Source::Internal),
            other => Err(PositioningError::validation(format!(
                "unknown source tag '{other}'"
            ))),
        }
    }
}

/// Kind of positioning alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Large speculators above the upper percentile of their history.
    MaxNetLong,
    /// Large speculators below the lower percentile of their history.
    ExtremeNetShort,
    /// Week-over-week change larger than the configured fraction of mean exposure.
    RapidChange,
}

impl AlertKind {
    /// Returns the tag stored in the `alerts.kind` column.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::MaxNetLong => "max_net_long",
            AlertKind::ExtremeNetShort => "extreme_net_short",
            AlertKind::RapidChange => "rapid_change",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = PositioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_net_long" => Ok(AlertKind::MaxNetLong),
            "extreme_net_short" => Ok(AlertKind::ExtremeNetShort),
            "rapid_change" => Ok(AlertKind::RapidChange),
            other => Err(PositioningError::validation(format!(
                "unknown alert kind '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tags_parse_back() {
        for source in [Source::PositioningReport, Source::PriceVendor, Source::Internal] {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
    }

    #[test]
    fn test_unknown_source_is_validation_error() {
        let err = "yahoo".parse::<Source>().unwrap_err();
        assert!(matches!(err, PositioningError::Validation(_)));
    }

    #[test]
    fn test_alert_kind_serde_matches_column_tag() {
        let json = serde_json::to_string(&AlertKind::ExtremeNetShort).unwrap();
        assert_eq!(json, "\"extreme_net_short\"");
        assert_eq!("rapid_change".parse::<AlertKind>().unwrap(), AlertKind::RapidChange);
    }
}
