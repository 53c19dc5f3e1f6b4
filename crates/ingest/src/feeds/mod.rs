//! Vendor feed clients.

pub mod cftc;
pub mod yahoo;

pub use cftc::{parse_archive, CftcPositioningFeed};
pub use yahoo::YahooPriceFeed;
