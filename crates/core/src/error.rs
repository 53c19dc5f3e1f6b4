//! Error taxonomy shared by every crate in the workspace.
//!
//! Only [`PositioningError::NotFound`] and exhausted
//! [`PositioningError::Connectivity`] errors are expected to reach the
//! caller of a batch run. Everything else is handled where it occurs.

use thiserror::Error;

/// Errors raised by identity resolution, storage, alerting and ingestion.
#[derive(Debug, Error)]
pub enum PositioningError {
    /// The requested entity does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing entity.
        what: String,
    },

    /// A single input row or vendor payload is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness constraint was hit while creating a row.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A vendor fetch failed at the transport level.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Fewer reports than the alert engine needs.
    #[error("insufficient history: {available} reports available, {required} required")]
    InsufficientHistory {
        /// Reports found for the market.
        available: usize,
        /// Minimum reports needed.
        required: usize,
    },

    /// Storage backend failure that is not a constraint conflict.
    #[error("database error: {0}")]
    Database(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PositioningError {
    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Creates an insufficient-history error.
    pub fn insufficient_history(available: usize, required: usize) -> Self {
        Self::InsufficientHistory {
            available,
            required,
        }
    }

    /// Returns true if the operation should be retried with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Returns true if a batch run must report this error as a per-market failure.
    #[must_use]
    pub fn is_surfaced(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Connectivity(_))
    }

    /// Returns true if the error is a soft "no signal" outcome.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::InsufficientHistory { .. })
    }
}

/// Result type alias for positioning operations.
pub type Result<T> = std::result::Result<T, PositioningError>;
