//! Market identity resolution and time-series storage.
//!
//! This crate provides:
//! - The identity resolver that maps vendor identifiers onto canonical markets
//! - Storage traits with a `PostgreSQL` implementation and an in-memory one
//! - Data models for markets, aliases, prices, positioning reports and alerts
//! - Static symbol tables for the supported report and price vendors

pub mod database;
pub mod mapping;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod resolver;
pub mod store;

pub use database::DatabaseClient;
pub use memory::MemoryMarketStore;
pub use resolver::MarketResolver;
pub use store::{AlertStore, MarketRegistry, MarketStore, TimeSeriesStore};

pub use models::{
    merge_series, Alert, Market, MarketAlias, NewAlert, NewMarket, PositionCounts,
    PositioningReport, PricePoint, SeriesPoint,
};

pub use repositories::{
    AlertRepository, MarketRepository, PositioningRepository, PriceRepository, Repositories,
};
