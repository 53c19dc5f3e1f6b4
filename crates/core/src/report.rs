//! Outcome of a multi-market batch run.

use std::fmt;

use crate::error::PositioningError;

/// A market (or report year) that was skipped during a batch run.
#[derive(Debug)]
pub struct MarketFailure {
    /// Symbol, ticker or `COT <year>` the failure belongs to.
    pub market: String,
    pub error: PositioningError,
}

impl fmt::Display for MarketFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.market, self.error)
    }
}

/// Counters and per-market failures collected by a batch run.
///
/// A failure in one market never aborts the run; it lands in `failures`.
#[derive(Debug, Default)]
pub struct RunReport {
    pub markets_processed: usize,
    pub rows_written: usize,
    /// Rows already stored or rejected as malformed.
    pub rows_skipped: usize,
    pub alerts_created: usize,
    pub failures: Vec<MarketFailure>,
}

impl RunReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, market: impl Into<String>, error: PositioningError) {
        self.failures.push(MarketFailure {
            market: market.into(),
            error,
        });
    }

    /// Folds another report into this one.
    pub fn merge(&mut self, other: RunReport) {
        self.markets_processed += other.markets_processed;
        self.rows_written += other.rows_written;
        self.rows_skipped += other.rows_skipped;
        self.alerts_created += other.alerts_created;
        self.failures.extend(other.failures);
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} markets processed, {} rows written, {} rows skipped, {} alerts created, {} failures",
            self.markets_processed,
            self.rows_written,
            self.rows_skipped,
            self.alerts_created,
            self.failures.len()
        )
    }
}
