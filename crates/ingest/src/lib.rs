//! Vendor feeds and ingestion pipelines.
//!
//! This crate provides:
//! - The CFTC yearly archive client and the Yahoo chart client
//! - COT column normalisation and row validation
//! - Bounded retry with exponential backoff for vendor fetches
//! - Price and report pipelines with per-market failure isolation

pub mod feeds;
pub mod http;
pub mod normalize;
pub mod pipeline;
pub mod retry;

pub use feeds::{CftcPositioningFeed, YahooPriceFeed};
pub use http::build_client;
pub use normalize::{normalize_header, CotRecord};
pub use pipeline::{ingest_price_rows, ingest_report_rows, IngestPipeline, IngestStats, RunOutcome};
pub use retry::with_retry;
