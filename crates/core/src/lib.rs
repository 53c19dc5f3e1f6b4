pub mod config;
pub mod config_loader;
pub mod error;
pub mod report;
pub mod traits;
pub mod types;

pub use config::{AlertConfig, AppConfig, DatabaseConfig, IngestConfig, RetryConfig};
pub use config_loader::ConfigLoader;
pub use error::{PositioningError, Result};
pub use report::{MarketFailure, RunReport};
pub use traits::{CotYear, PositioningFeed, PriceBar, PriceFeed, RawCotRow};
pub use types::{AlertKind, MarketId, Source};
