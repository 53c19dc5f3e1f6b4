//! Positioning statistics and alerting.
//!
//! - [`stats`]: percentile and mean-absolute helpers
//! - [`generator`]: pure signal generators over report history
//! - [`engine`]: the alert engine that deduplicates and persists alerts

pub mod engine;
pub mod generator;
pub mod stats;

pub use engine::AlertEngine;
pub use generator::{CandidateAlert, PositioningSignal};
pub use stats::{mean_abs, percentile};
