//! Process configuration, read once at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Runtime environment the error pipeline renders for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Full diagnostics in error responses.
    Development,
    /// Client-safe error responses only.
    Production,
}

impl Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "development" => Some(Mode::Development),
            "production" => Some(Mode::Production),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Per-IP request budget on `/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max: 100,
            window: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: Mode,
    pub port: u16,
    pub public_dir: PathBuf,
    pub rate_limit: RateLimitConfig,
    pub body_limit: usize,
}

impl AppConfig {
    /// Defaults for `mode`: port 3000, `./public`, 100 requests/hour, 10kb bodies.
    pub fn for_mode(mode: Mode) -> Self {
        Self {
            mode,
            port: 3000,
            public_dir: PathBuf::from("public"),
            rate_limit: RateLimitConfig::default(),
            body_limit: 10 * 1024,
        }
    }

    /// Load from the process environment, after reading `config.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::from_filename("config.env") {
            tracing::info!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (see [`AppConfig::from_env`] for the keys).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = match lookup("APP_ENV") {
            None => Mode::Production,
            Some(raw) => Mode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(APP_ENV = %raw, "unrecognized APP_ENV; using production error responses");
                Mode::Production
            }),
        };

        let mut config = Self::for_mode(mode);

        if let Some(port) = number(&lookup, "PORT")? {
            config.port = port;
        }
        if let Some(dir) = lookup("PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }
        if let Some(max) = number(&lookup, "RATE_LIMIT_MAX")? {
            config.rate_limit.max = max;
        }
        if let Some(secs) = number(&lookup, "RATE_LIMIT_WINDOW_SECS")? {
            config.rate_limit.window = Duration::from_secs(secs);
        }
        if let Some(bytes) = number(&lookup, "BODY_LIMIT_BYTES")? {
            config.body_limit = bytes;
        }

        Ok(config)
    }
}

fn number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}
