//! Configuration management for the poolbook daemon
//!
//! Configuration loads from a TOML file or from `POOLBOOK_*` environment
//! variables. Portal endpoints are configurable so tests can point the
//! client at a mock server; the defaults match the live portal.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed Safari user agent; the portal rejects requests that do not look
/// like a browser.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Portal endpoints and request settings
    pub portal: PortalConfig,

    /// Booking loop configuration
    pub booking: BookingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Portal-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Base URL of the booking site
    pub base_url: String,

    /// Base URL of the SSO login site
    pub sso_url: String,

    /// Login domain constant sent with the authentication form
    pub login_domain: String,

    /// Facility code identifying the pool
    pub facility_code: String,

    /// User agent string sent on every request
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Booking loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Path to the CSV file of desired booking times
    pub preferences_path: PathBuf,

    /// Hours past the attempted target before the next cycle starts
    pub retry_offset_hours: i64,

    /// Hours to wait before rereading a broken preference file
    pub preference_retry_hours: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url =
            std::env::var("POOLBOOK_BASE_URL").unwrap_or(defaults.portal.base_url);
        let sso_url = std::env::var("POOLBOOK_SSO_URL").unwrap_or(defaults.portal.sso_url);
        let login_domain =
            std::env::var("POOLBOOK_LOGIN_DOMAIN").unwrap_or(defaults.portal.login_domain);
        let facility_code =
            std::env::var("POOLBOOK_FACILITY").unwrap_or(defaults.portal.facility_code);
        let user_agent =
            std::env::var("POOLBOOK_USER_AGENT").unwrap_or(defaults.portal.user_agent);

        let request_timeout_secs = std::env::var("POOLBOOK_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.portal.request_timeout_secs);

        let preferences_path = std::env::var("POOLBOOK_PREFERENCES")
            .map(PathBuf::from)
            .unwrap_or(defaults.booking.preferences_path);

        let retry_offset_hours = std::env::var("POOLBOOK_RETRY_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.booking.retry_offset_hours);

        let preference_retry_hours = std::env::var("POOLBOOK_PREFERENCE_RETRY_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults.booking.preference_retry_hours);

        let level = std::env::var("POOLBOOK_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("POOLBOOK_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            portal: PortalConfig {
                base_url,
                sso_url,
                login_domain,
                facility_code,
                user_agent,
                request_timeout_secs,
            },
            booking: BookingConfig {
                preferences_path,
                retry_offset_hours,
                preference_retry_hours,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("portal.base_url", &self.portal.base_url),
            ("portal.sso_url", &self.portal.sso_url),
        ] {
            if url.is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
            if url.ends_with('/') {
                anyhow::bail!("{name} must not end with a slash");
            }
        }

        if self.portal.facility_code.is_empty() {
            anyhow::bail!("portal.facility_code must not be empty");
        }

        if self.booking.retry_offset_hours <= 0 {
            anyhow::bail!("booking.retry_offset_hours must be positive");
        }

        if self.booking.preference_retry_hours <= 0 {
            anyhow::bail!("booking.preference_retry_hours must be positive");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.portal.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig {
                base_url: String::from("https://wis.ntu.edu.sg"),
                sso_url: String::from("https://sso.wis.ntu.edu.sg"),
                login_domain: String::from("STUDENT"),
                facility_code: String::from("2SP225"),
                user_agent: String::from(DEFAULT_USER_AGENT),
                request_timeout_secs: 30,
            },
            booking: BookingConfig {
                preferences_path: PathBuf::from("preferences.csv"),
                retry_offset_hours: 2,
                preference_retry_hours: 1,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}
