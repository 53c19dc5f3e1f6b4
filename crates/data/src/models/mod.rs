//! Data models for markets, aliases, prices, positioning reports and alerts.
//!
//! Models derive `sqlx::FromRow` where the table layout maps one-to-one.
//! Enumerated columns go through private row types.

pub mod alert;
pub mod market;
pub mod positioning;
pub mod price;
pub mod series;

pub use alert::{Alert, NewAlert};
pub(crate) use alert::AlertRow;
pub use market::{Market, MarketAlias, NewMarket};
pub(crate) use market::MarketAliasRow;
pub use positioning::{PositionCounts, PositioningReport};
pub use price::PricePoint;
pub use series::{merge_series, SeriesPoint};
