use std::str::FromStr;
use std::time::Duration;

use crate::rate_limit::RateLimitConfig;
use crate::repo::inmem::DEFAULT_MAX_SESSIONS;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}: cannot parse {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Runtime settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub frontend_url: Option<String>,
    pub enable_hsts: bool,
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub max_sessions: usize,
    pub rate_limit_enabled: bool,
    pub rate_limit: RateLimitConfig,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = RateLimitConfig::default();
        let cfg = Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            frontend_url: lookup("FRONTEND_URL").filter(|v| !v.trim().is_empty()),
            enable_hsts: flag(&lookup, "ENABLE_HSTS", false),
            session_idle_ttl: secs(&lookup, "SESSION_IDLE_TTL_SECS", 3600)?,
            session_sweep_interval: secs(&lookup, "SESSION_SWEEP_SECS", 60)?,
            max_sessions: parsed(&lookup, "MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
            rate_limit_enabled: flag(&lookup, "RL_ENABLED", true),
            rate_limit: RateLimitConfig {
                report_limit: parsed(&lookup, "RL_REPORT_LIMIT", defaults.report_limit)?,
                report_window: secs(&lookup, "RL_REPORT_WINDOW", defaults.report_window.as_secs())?,
            },
            metrics_enabled: flag(&lookup, "METRICS_ENABLED", true),
        };
        if cfg.session_idle_ttl.is_zero() { return Err(ConfigError::Zero("SESSION_IDLE_TTL_SECS")); }
        if cfg.session_sweep_interval.is_zero() { return Err(ConfigError::Zero("SESSION_SWEEP_SECS")); }
        if cfg.max_sessions == 0 { return Err(ConfigError::Zero("MAX_SESSIONS")); }
        Ok(cfg)
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    lookup(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { name, value: v }),
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    parsed(lookup, name, default).map(Duration::from_secs)
}
