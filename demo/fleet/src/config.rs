//! Fleet configuration.
//!
//! Every option is a command-line flag with an environment fallback:
//!
//! | Flag          | Environment         | Default                 |
//! |---------------|---------------------|-------------------------|
//! | `--interval`  | `FLEET_INTERVAL`    | `5m`                    |
//! | `--batch`     | `FLEET_BATCH`       | `5m`                    |
//! | `--num`       | `FLEET_NUM_DEVICES` | `1`                     |
//! | `--api`       | `FLEET_API_URL`     | `http://localhost:8080` |
//! | `--timeout`   | `FLEET_TIMEOUT`     | `30s`                   |
//! | `--log-level` | `FLEET_LOG_LEVEL`   | `info`                  |
//!
//! Durations use unit-suffixed notation (`30s`, `5m`, `1h30m`, `1.5h`) and
//! must end in `s`, `m` or `h`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::device::DeviceConfig;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors. All of them are fatal at startup.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Duration string could not be parsed
    #[error("Invalid duration '{0}': expected a value such as 30s, 5m or 1h30m")]
    InvalidDuration(String),

    /// Duration parsed to zero
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// Device count out of range
    #[error("Number of devices must be at least 1")]
    NoDevices,

    /// API base URL is not an absolute http(s) URL
    #[error("Invalid API URL '{0}'")]
    InvalidApiUrl(String),

    /// Unknown log level
    #[error("Invalid log level '{0}': must be one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Command-line arguments for `fleet_sim`
#[derive(Parser, Debug, Clone)]
#[command(name = "fleet_sim")]
#[command(version, about = "Simulated fleet of environmental-control devices", long_about = None)]
pub struct FleetArgs {
    /// Interval between samples (e.g. 30s, 5m, 1h)
    #[arg(long, env = "FLEET_INTERVAL", default_value = "5m")]
    pub interval: String,

    /// Interval between batch uploads (e.g. 30s, 5m, 1h)
    #[arg(long, env = "FLEET_BATCH", default_value = "5m")]
    pub batch: String,

    /// Number of devices to simulate
    #[arg(short, long, env = "FLEET_NUM_DEVICES", default_value_t = 1)]
    pub num: usize,

    /// Base URL of the telemetry server
    #[arg(long, env = "FLEET_API_URL", default_value = "http://localhost:8080")]
    pub api: String,

    /// Per-request timeout for batch uploads
    #[arg(long, env = "FLEET_TIMEOUT", default_value = "30s")]
    pub timeout: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FLEET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated fleet configuration
#[derive(Debug, Clone, PartialEq)]
pub struct FleetConfig {
    /// Sampling cadence of every device
    pub sample_interval: Duration,
    /// Batching cadence of every device
    pub batch_interval: Duration,
    /// Number of simulated devices
    pub num_devices: usize,
    /// Telemetry server base URL
    pub api_url: String,
    /// Upload request timeout
    pub request_timeout: Duration,
    /// Log filter level
    pub log_level: String,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(300),
            batch_interval: Duration::from_secs(300),
            num_devices: 1,
            api_url: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
        }
    }
}

impl FleetConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("interval"));
        }
        if self.batch_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("batch"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("timeout"));
        }
        if self.num_devices == 0 {
            return Err(ConfigError::NoDevices);
        }

        match reqwest::Url::parse(&self.api_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidApiUrl(self.api_url.clone())),
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }

    /// Per-device timer settings
    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig {
            sample_interval: self.sample_interval,
            batch_interval: self.batch_interval,
        }
    }
}

impl TryFrom<FleetArgs> for FleetConfig {
    type Error = ConfigError;

    fn try_from(args: FleetArgs) -> Result<Self, Self::Error> {
        let config = Self {
            sample_interval: parse_duration(&args.interval)?,
            batch_interval: parse_duration(&args.batch)?,
            num_devices: args.num,
            api_url: args.api,
            request_timeout: parse_duration(&args.timeout)?,
            log_level: args.log_level.to_lowercase(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Parse a unit-suffixed duration such as `300ms`, `1.5s`, `5m` or `1h30m`.
///
/// Accepted units are `ns`, `us`/`µs`, `ms`, `s`, `m` and `h`. The whole
/// string must end in `s`, `m` or `h`, so a bare number is rejected.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let s = input.trim();

    if !s.ends_with(['s', 'm', 'h']) {
        return Err(invalid());
    }

    let mut nanos = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return Err(invalid()),
        };
        nanos += value * scale;
        rest = &rest[unit_len..];
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(nanos.round() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> FleetArgs {
        let mut argv = vec!["fleet_sim"];
        argv.extend_from_slice(extra);
        FleetArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_duration_single_units() {
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_duration_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("1m500ms").unwrap(), Duration::from_millis(60_500));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
    }

    #[test]
    fn test_parse_duration_rejects_malformed() {
        for bad in ["", "10", "5d", "m", "5 m", "1.2.3s", "-5m", "5x3s"] {
            assert_eq!(
                parse_duration(bad),
                Err(ConfigError::InvalidDuration(bad.to_string())),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_duration_nanoseconds_end_in_s() {
        assert_eq!(parse_duration("5ns").unwrap(), Duration::from_nanos(5));
    }

    #[test]
    fn test_default_args() {
        let config = FleetConfig::try_from(args(&[])).unwrap();
        assert_eq!(config, FleetConfig::default());
    }

    #[test]
    fn test_args_override_defaults() {
        let config = FleetConfig::try_from(args(&[
            "--interval",
            "1s",
            "--batch",
            "10s",
            "--num",
            "25",
            "--api",
            "http://collector:9000",
            "--timeout",
            "5s",
            "--log-level",
            "DEBUG",
        ]))
        .unwrap();

        assert_eq!(config.sample_interval, Duration::from_secs(1));
        assert_eq!(config.batch_interval, Duration::from_secs(10));
        assert_eq!(config.num_devices, 25);
        assert_eq!(config.api_url, "http://collector:9000");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_zero_values_rejected() {
        assert_eq!(
            FleetConfig::try_from(args(&["--interval", "0s"])),
            Err(ConfigError::ZeroDuration("interval"))
        );
        assert_eq!(
            FleetConfig::try_from(args(&["--batch", "0m"])),
            Err(ConfigError::ZeroDuration("batch"))
        );
        assert_eq!(
            FleetConfig::try_from(args(&["--num", "0"])),
            Err(ConfigError::NoDevices)
        );
    }

    #[test]
    fn test_invalid_api_and_log_level_rejected() {
        assert!(matches!(
            FleetConfig::try_from(args(&["--api", "localhost:8080"])),
            Err(ConfigError::InvalidApiUrl(_))
        ));
        assert!(matches!(
            FleetConfig::try_from(args(&["--api", "ftp://host"])),
            Err(ConfigError::InvalidApiUrl(_))
        ));
        assert!(matches!(
            FleetConfig::try_from(args(&["--log-level", "verbose"])),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_device_config_carries_intervals() {
        let config = FleetConfig {
            sample_interval: Duration::from_secs(2),
            batch_interval: Duration::from_secs(20),
            ..Default::default()
        };
        let device = config.device_config();
        assert_eq!(device.sample_interval, Duration::from_secs(2));
        assert_eq!(device.batch_interval, Duration::from_secs(20));
    }
}
