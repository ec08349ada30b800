//! Configuration loading and representation.
//!
//! Everything comes from `JOBGATE_*` environment variables with defaults
//! suitable for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use jobgate_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "JOBGATE_BIND_ADDR";
pub const POLL_INTERVAL_VAR: &str = "JOBGATE_POLL_INTERVAL_SECS";
pub const CHECK_TIMEOUT_VAR: &str = "JOBGATE_CHECK_TIMEOUT_MS";
pub const LOG_FORMAT_VAR: &str = "JOBGATE_LOG_FORMAT";
pub const SEED_FILE_VAR: &str = "JOBGATE_SEED_FILE";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {var}={value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Process configuration for the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub bind_addr: SocketAddr,
    /// Ban-status polling cadence.
    pub poll_interval: Duration,
    /// Bound on a single backend check.
    pub check_timeout: Duration,
    pub log_format: LogFormat,
    /// Optional JSON seed for the in-memory backend.
    pub seed_file: Option<PathBuf>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            poll_interval: Duration::from_secs(30),
            check_timeout: Duration::from_millis(5_000),
            log_format: LogFormat::Json,
            seed_file: None,
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(BIND_ADDR_VAR) {
            config.bind_addr = parse(BIND_ADDR_VAR, &value)?;
        }
        if let Some(value) = get(POLL_INTERVAL_VAR) {
            let secs: u64 = parse(POLL_INTERVAL_VAR, &value)?;
            config.poll_interval = positive(POLL_INTERVAL_VAR, &value, Duration::from_secs(secs))?;
        }
        if let Some(value) = get(CHECK_TIMEOUT_VAR) {
            let ms: u64 = parse(CHECK_TIMEOUT_VAR, &value)?;
            config.check_timeout = positive(CHECK_TIMEOUT_VAR, &value, Duration::from_millis(ms))?;
        }
        if let Some(value) = get(LOG_FORMAT_VAR) {
            config.log_format = parse(LOG_FORMAT_VAR, &value)?;
        }
        config.seed_file = get(SEED_FILE_VAR).map(PathBuf::from);

        Ok(config)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn positive(var: &'static str, value: &str, d: Duration) -> Result<Duration, ConfigError> {
    if d.is_zero() {
        return Err(ConfigError {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(d)
}
