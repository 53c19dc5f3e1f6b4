//! Large-speculator positioning extremes.
//!
//! Compares the latest net position of large speculators against the
//! distribution of the trailing window, and flags week-over-week moves that
//! are large relative to the typical absolute net position.

use positioning_core::{AlertConfig, AlertKind, PositioningError, Result};
use positioning_data::PositioningReport;
use serde::Serialize;

use crate::stats::{mean_abs, percentile};

/// An alert produced by a generator, before deduplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAlert {
    pub kind: AlertKind,
    /// Deterministic text; part of the dedup key.
    pub message: String,
    pub value: f64,
}

/// Percentile and rapid-change rules for large-speculator net positions.
#[derive(Debug, Clone)]
pub struct PositioningSignal {
    config: AlertConfig,
}

impl Default for PositioningSignal {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

impl PositioningSignal {
    #[must_use]
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Evaluates a history window ordered most recent first.
    ///
    /// Only the first `window` reports are used. The first report is the one
    /// being judged; it is also part of the distribution.
    ///
    /// # Errors
    /// Returns `InsufficientHistory` when the window holds fewer than
    /// `min_history` reports.
    pub fn generate(&self, name: &str, history: &[PositioningReport]) -> Result<Vec<CandidateAlert>> {
        let window = &history[..history.len().min(self.config.window)];
        if window.len() < self.config.min_history || window.is_empty() {
            return Err(PositioningError::insufficient_history(
                window.len(),
                self.config.min_history.max(1),
            ));
        }

        let nets: Vec<i64> = window.iter().map(PositioningReport::large_spec_net).collect();
        let sample: Vec<f64> = nets.iter().map(|n| *n as f64).collect();
        let current = nets[0];
        let mut alerts = Vec::new();

        if let Some(upper) = percentile(&sample, self.config.upper_percentile) {
            if (current as f64) > upper {
                alerts.push(CandidateAlert {
                    kind: AlertKind::MaxNetLong,
                    message: format!(
                        "{name} large speculators are at maximum net long (current: {current}, {} percentile: {upper:.0})",
                        ordinal(self.config.upper_percentile)
                    ),
                    value: current as f64,
                });
            }
        }

        if let Some(lower) = percentile(&sample, self.config.lower_percentile) {
            if (current as f64) < lower {
                alerts.push(CandidateAlert {
                    kind: AlertKind::ExtremeNetShort,
                    message: format!(
                        "{name} large speculators are at extreme net short (current: {current}, {} percentile: {lower:.0})",
                        ordinal(self.config.lower_percentile)
                    ),
                    value: current as f64,
                });
            }
        }

        if nets.len() >= 2 {
            let change = current - nets[1];
            let typical = mean_abs(&sample).unwrap_or_default();
            if (change.abs() as f64) > self.config.rapid_change_fraction * typical {
                alerts.push(CandidateAlert {
                    kind: AlertKind::RapidChange,
                    message: format!(
                        "{name} large speculators have rapidly changed positioning (change: {change:+})"
                    ),
                    value: change as f64,
                });
            }
        }

        Ok(alerts)
    }
}

/// `90.0` -> `90th`, `2.0` -> `2nd`, `12.5` -> `12.5th`.
fn ordinal(p: f64) -> String {
    if p.fract() != 0.0 {
        return format!("{p}th");
    }
    let n = p as i64;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
