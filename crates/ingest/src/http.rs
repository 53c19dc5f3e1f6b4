//! Shared HTTP plumbing for vendor feeds.

use positioning_core::{PositioningError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; positioning-watch/0.1)";

/// Builds the HTTP client used by every feed.
///
/// # Errors
/// Returns `Configuration` if the TLS backend cannot be initialised.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| PositioningError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Classifies a transport-level failure.
pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> PositioningError {
    if err.is_decode() {
        PositioningError::validation(format!("malformed response from {url}: {err}"))
    } else {
        PositioningError::connectivity(format!("request to {url} failed: {err}"))
    }
}

/// Server errors and rate limiting are transient; any other non-success
/// status means the request itself is wrong.
pub(crate) fn check_status(url: &str, status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PositioningError::connectivity(format!(
            "{url} returned {status}"
        )));
    }
    Err(PositioningError::validation(format!("{url} returned {status}")))
}
