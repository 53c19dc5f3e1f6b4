use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PositioningError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub cftc_base_url: String,
    pub yahoo_base_url: String,
    /// Vendor tickers fetched by the price pipeline.
    pub price_tickers: Vec<String>,
    pub price_start: NaiveDate,
    pub cot_start_year: i32,
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Thresholds for the positioning alert engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Most recent reports considered, including the latest one.
    pub window: usize,
    /// Minimum reports required before any signal is produced.
    pub min_history: usize,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
    /// Fraction of mean absolute net position that counts as a rapid change.
    pub rapid_change_fraction: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/positioning".to_string(),
                max_connections: 10,
            },
            ingest: IngestConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            cftc_base_url: "https://www.cftc.gov".to_string(),
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            price_tickers: ["BTC-USD", "GC=F", "XRP-USD", "ETH-USD"]
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            price_start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            cot_start_year: 2023,
            request_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 500,
            max_delay_ms: 8_000,
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            window: 200,
            min_history: 100,
            upper_percentile: 90.0,
            lower_percentile: 10.0,
            rapid_change_fraction: 0.10,
        }
    }
}

impl AppConfig {
    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `Configuration` if any threshold is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(PositioningError::Configuration(
                "database.max_connections must be > 0".to_string(),
            ));
        }
        if self.ingest.retry.max_attempts == 0 {
            return Err(PositioningError::Configuration(
                "ingest.retry.max_attempts must be > 0".to_string(),
            ));
        }
        self.alerts.validate()
    }
}

impl AlertConfig {
    /// # Errors
    /// Returns `Configuration` if the percentiles or window sizes are inconsistent.
    pub fn validate(&self) -> Result<()> {
        let in_range = |p: f64| (0.0..=100.0).contains(&p);
        if !in_range(self.lower_percentile) || !in_range(self.upper_percentile) {
            return Err(PositioningError::Configuration(
                "alert percentiles must lie in [0, 100]".to_string(),
            ));
        }
        if self.lower_percentile >= self.upper_percentile {
            return Err(PositioningError::Configuration(format!(
                "lower percentile {} must be below upper percentile {}",
                self.lower_percentile, self.upper_percentile
            )));
        }
        if self.min_history < 2 || self.window < self.min_history {
            return Err(PositioningError::Configuration(format!(
                "alert window {} must be >= min_history {} (and min_history >= 2)",
                self.window, self.min_history
            )));
        }
        if self.rapid_change_fraction <= 0.0 {
            return Err(PositioningError::Configuration(
                "rapid_change_fraction must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_alert_thresholds() {
        let alerts = AlertConfig::default();
        assert_eq!(alerts.window, 200);
        assert_eq!(alerts.min_history, 100);
        assert!((alerts.upper_percentile - 90.0).abs() < f64::EPSILON);
        assert!((alerts.lower_percentile - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inverted_percentiles_rejected() {
        let alerts = AlertConfig {
            upper_percentile: 10.0,
            lower_percentile: 90.0,
            ..AlertConfig::default()
        };
        assert!(matches!(
            alerts.validate(),
            Err(PositioningError::Configuration(_))
        ));
    }

    #[test]
    fn test_window_smaller_than_min_history_rejected() {
        let alerts = AlertConfig {
            window: 50,
            ..AlertConfig::default()
        };
        assert!(alerts.validate().is_err());
    }

    #[test]
    fn test_zero_retry_attempts_rejected() {
        let mut config = AppConfig::default();
        config.ingest.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
