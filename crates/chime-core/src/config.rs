use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_HORIZON_HOURS: i64 = 24;
/// Twilio's magic test number — replace with a real sender in production.
pub const DEFAULT_SENDER_NUMBER: &str = "+15005550006";
/// Indian Standard Time; has no DST, so a fixed offset is exact.
pub const DEFAULT_ZONE_OFFSET: &str = "+05:30";

/// Top-level config (chime.toml + CHIME_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub timezone: TimezoneConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
}

/// Operational knobs for the driver loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// How often due reminders are checked (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// How often the upcoming-reminder report is re-emitted (seconds).
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
    /// Forward-looking window for the upcoming report (hours).
    #[serde(default = "default_horizon")]
    pub horizon_hours: i64,
    /// Sender identity passed to the notifier (E.164).
    #[serde(default = "default_sender_number")]
    pub sender_number: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            horizon_hours: DEFAULT_HORIZON_HOURS,
            sender_number: DEFAULT_SENDER_NUMBER.to_string(),
        }
    }
}

/// Reference zone for all scheduling arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezoneConfig {
    /// Fixed UTC offset, `+HH:MM` or `-HH:MM`.
    #[serde(default = "default_zone_offset")]
    pub offset: String,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            offset: DEFAULT_ZONE_OFFSET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Twilio REST credentials. When `simulate` is true no network calls are
/// made and dispatches are logged as successes (useful in development).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default = "default_twilio_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub simulate: bool,
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            base_url: default_twilio_base_url(),
            simulate: false,
        }
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}
fn default_report_interval() -> u64 {
    DEFAULT_REPORT_INTERVAL_SECS
}
fn default_horizon() -> i64 {
    DEFAULT_HORIZON_HOURS
}
fn default_sender_number() -> String {
    DEFAULT_SENDER_NUMBER.to_string()
}
fn default_zone_offset() -> String {
    DEFAULT_ZONE_OFFSET.to_string()
}
fn default_twilio_base_url() -> String {
    "https://api.twilio.com".to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.chime/chime.db")
}

impl ChimeConfig {
    /// Load config from a TOML file with CHIME_* env var overrides
    /// (double underscore separates nesting: `CHIME_SERVICE__POLL_INTERVAL_SECS`).
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.chime/chime.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ChimeConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("CHIME_").split("__"))
            .extract()
            .map_err(|e| crate::error::ChimeError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.chime/chime.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ChimeConfig::default();
        assert_eq!(cfg.service.poll_interval_secs, 60);
        assert_eq!(cfg.service.report_interval_secs, 3600);
        assert_eq!(cfg.service.horizon_hours, 24);
        assert_eq!(cfg.timezone.offset, "+05:30");
        assert!(!cfg.twilio.simulate);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = ChimeConfig::load(Some("/nonexistent/chime.toml")).unwrap();
        assert_eq!(cfg.service.poll_interval_secs, 60);
    }
}
