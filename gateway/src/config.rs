//! Runtime configuration for the gateway

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SENSOR_URL: &str = "http://localhost:9090/sensors";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_LOG_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_ANGLE_THRESHOLD_DEG: f64 = 1.0;
pub const DEFAULT_MAX_PIN: u8 = 53;

/// Remote log sink settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSinkConfig {
    pub endpoint: String,
    pub token: String,
}

/// Validated gateway configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub bind_address: SocketAddr,
    pub sensor_url: String,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub log_sink: Option<LogSinkConfig>,
    pub log_interval: Duration,
    pub angle_threshold_deg: f64,
    pub require_source_timestamp: bool,
    pub static_file: PathBuf,
    pub max_pin: u8,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let poll_interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            sensor_url: DEFAULT_SENSOR_URL.to_string(),
            poll_interval,
            fetch_timeout: default_fetch_timeout(poll_interval),
            log_sink: None,
            log_interval: Duration::from_millis(DEFAULT_LOG_INTERVAL_MS),
            angle_threshold_deg: DEFAULT_ANGLE_THRESHOLD_DEG,
            require_source_timestamp: false,
            static_file: PathBuf::from("./static/index.html"),
            max_pin: DEFAULT_MAX_PIN,
        }
    }
}

/// Fetch timeout used when none is configured: 80% of the poll period
pub fn default_fetch_timeout(poll_interval: Duration) -> Duration {
    poll_interval.mul_f64(0.8)
}

impl GatewayConfig {
    /// Check cross-field constraints, returning the config on success
    pub fn validate(self) -> GatewayResult<Self> {
        if self.poll_interval.is_zero() {
            return Err(GatewayError::config("poll interval must be greater than zero"));
        }

        if self.fetch_timeout.is_zero() || self.fetch_timeout >= self.poll_interval {
            return Err(GatewayError::config(format!(
                "fetch timeout ({}ms) must be non-zero and shorter than the poll interval ({}ms)",
                self.fetch_timeout.as_millis(),
                self.poll_interval.as_millis()
            )));
        }

        if self.log_interval.is_zero() {
            return Err(GatewayError::config("log interval must be greater than zero"));
        }

        if !self.angle_threshold_deg.is_finite() || self.angle_threshold_deg <= 0.0 {
            return Err(GatewayError::config(format!(
                "angle threshold must be a positive number of degrees, got {}",
                self.angle_threshold_deg
            )));
        }

        validate_http_url("sensor url", &self.sensor_url)?;

        if let Some(sink) = &self.log_sink {
            validate_http_url("log endpoint", &sink.endpoint)?;
            if sink.token.trim().is_empty() {
                return Err(GatewayError::config("log endpoint configured without an auth token"));
            }
        }

        Ok(self)
    }
}

fn validate_http_url(field: &str, value: &str) -> GatewayResult<()> {
    let parsed = url::Url::parse(value).map_err(|e| GatewayError::config(format!("invalid {field} '{value}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GatewayError::config(format!("{field} must be http(s), got scheme '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_are_valid() {
        let config = assert_ok!(GatewayConfig::default().validate());
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert_eq!(config.fetch_timeout, Duration::from_millis(80));
        assert_eq!(config.log_interval, Duration::from_millis(5000));
        assert_eq!(config.angle_threshold_deg, 1.0);
        assert_eq!(config.bind_address.port(), 8000);
        assert!(config.log_sink.is_none());
    }

    #[test]
    fn test_fetch_timeout_must_be_shorter_than_poll_interval() {
        let config = GatewayConfig {
            fetch_timeout: Duration::from_millis(100),
            ..GatewayConfig::default()
        };
        assert!(matches!(config.validate(), Err(GatewayError::Config { .. })));

        let config = GatewayConfig {
            fetch_timeout: Duration::ZERO,
            ..GatewayConfig::default()
        };
        assert_err!(config.validate());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = GatewayConfig {
            poll_interval: Duration::ZERO,
            ..GatewayConfig::default()
        };
        assert_err!(config.validate());

        let config = GatewayConfig {
            log_interval: Duration::ZERO,
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_angle_threshold_must_be_positive() {
        for threshold in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = GatewayConfig {
                angle_threshold_deg: threshold,
                ..GatewayConfig::default()
            };
            assert!(config.validate().is_err(), "threshold {threshold} should be rejected");
        }
    }

    #[test]
    fn test_log_sink_requires_token_and_valid_url() {
        let config = GatewayConfig {
            log_sink: Some(LogSinkConfig {
                endpoint: "https://logs.example.com/ingest".to_string(),
                token: "  ".to_string(),
            }),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            log_sink: Some(LogSinkConfig {
                endpoint: "ftp://logs.example.com".to_string(),
                token: "secret".to_string(),
            }),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            log_sink: Some(LogSinkConfig {
                endpoint: "https://logs.example.com/ingest".to_string(),
                token: "secret".to_string(),
            }),
            ..GatewayConfig::default()
        };
        assert_ok!(config.validate());
    }

    #[test]
    fn test_invalid_sensor_url_rejected() {
        let config = GatewayConfig {
            sensor_url: "not a url".to_string(),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
