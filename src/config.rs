//! Service configuration
//!
//! Loaded from an optional `harness.{toml,yaml,json}` file and `HARNESS_*`
//! environment variables (nested keys use `__`, e.g. `HARNESS_TRAFFIC__SEED`).

use serde::Deserialize;
use std::io::IsTerminal;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub access_log: AccessLogConfig,
    pub traffic: TrafficConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            access_log: AccessLogConfig::default(),
            traffic: TrafficConfig::default(),
        }
    }
}

/// When access lines are styled with terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self) -> bool {
        match self {
            ColorMode::Auto => std::io::stdout().is_terminal(),
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Latency at or above this is shown in the warning style
    pub warn_latency_ms: f64,
    /// Latency at or above this is shown in the slow style
    pub slow_latency_ms: f64,
    pub favicon_cache_secs: u64,
    pub color: ColorMode,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            warn_latency_ms: 100.0,
            slow_latency_ms: 500.0,
            favicon_cache_secs: 31_536_000,
            color: ColorMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    pub enabled: bool,
    /// Defaults to the service's own loopback address
    pub base_url: Option<String>,
    pub warmup_secs: f64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub request_timeout_secs: f64,
    pub item_id_min: u32,
    pub item_id_max: u32,
    /// Fixed RNG seed; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
            warmup_secs: 2.0,
            min_delay_secs: 0.5,
            max_delay_secs: 2.0,
            request_timeout_secs: 5.0,
            item_id_min: 1000,
            item_id_max: 9999,
            seed: None,
        }
    }
}

impl TrafficConfig {
    pub fn warmup(&self) -> Duration {
        Duration::from_secs_f64(self.warmup_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.request_timeout_secs)
    }

    pub fn item_ids(&self) -> RangeInclusive<u32> {
        self.item_id_min..=self.item_id_max
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let delays = [
            ("traffic.warmup_secs", self.warmup_secs),
            ("traffic.min_delay_secs", self.min_delay_secs),
            ("traffic.max_delay_secs", self.max_delay_secs),
        ];
        for (key, value) in delays {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }
        if self.min_delay_secs > self.max_delay_secs {
            return Err(ConfigError::Invalid(format!(
                "traffic.min_delay_secs ({}) exceeds traffic.max_delay_secs ({})",
                self.min_delay_secs, self.max_delay_secs
            )));
        }
        if !self.request_timeout_secs.is_finite() || self.request_timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "traffic.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.item_id_min > self.item_id_max {
            return Err(ConfigError::Invalid(format!(
                "traffic item id range {}..={} is empty",
                self.item_id_min, self.item_id_max
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name("harness").required(false))
            .add_source(
                ::config::Environment::with_prefix("HARNESS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let log = &self.access_log;
        if !(log.warn_latency_ms >= 0.0 && log.warn_latency_ms <= log.slow_latency_ms) {
            return Err(ConfigError::Invalid(format!(
                "access_log latency thresholds must satisfy 0 <= warn ({}) <= slow ({})",
                log.warn_latency_ms, log.slow_latency_ms
            )));
        }
        self.traffic.validate()
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Where the traffic generator sends its requests
    pub fn traffic_base_url(&self) -> String {
        match &self.traffic.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}", self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        tokio_test::assert_ok!(config.validate());
        assert_eq!(config.port, 8000);
        assert_eq!(config.access_log.favicon_cache_secs, 31_536_000);
        assert_eq!(config.traffic.item_ids(), 1000..=9999);
        assert_eq!(config.traffic.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_base_url_derived_from_port() {
        let mut config = AppConfig::default();
        config.port = 9100;
        assert_eq!(config.traffic_base_url(), "http://127.0.0.1:9100");

        config.traffic.base_url = Some("http://localhost:8080/".to_string());
        assert_eq!(config.traffic_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_rejects_inverted_delay_range() {
        let mut config = AppConfig::default();
        config.traffic.min_delay_secs = 3.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_inverted_latency_thresholds() {
        let mut config = AppConfig::default();
        config.access_log.warn_latency_ms = 800.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_empty_item_range() {
        let mut config = AppConfig::default();
        config.traffic.item_id_min = 10;
        config.traffic.item_id_max = 9;
        tokio_test::assert_err!(config.validate());
    }

    #[test]
    fn test_color_mode_explicit() {
        assert!(ColorMode::Always.enabled());
        assert!(!ColorMode::Never.enabled());
    }
}
