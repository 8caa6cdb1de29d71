//! Runtime configuration.
//!
//! `Config::from_env` reads `HARVEST_*` variables and falls back to defaults
//! for anything unset. Values that are set but unparsable are rejected rather
//! than silently replaced by the default.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_MAX_BODY_BYTES: &str = "HARVEST_MAX_BODY_BYTES";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "HARVEST_CONNECT_TIMEOUT_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "HARVEST_REQUEST_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "HARVEST_USER_AGENT";
pub const ENV_STREAM_CACHE: &str = "HARVEST_STREAM_CACHE";
pub const ENV_DETECT_CONTENT_TYPE: &str = "HARVEST_DETECT_CONTENT_TYPE";
pub const ENV_VALIDATION: &str = "HARVEST_VALIDATION";

const DEFAULT_MAX_BODY_BYTES: u64 = 5 * 1024 * 1024; // 5MB
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "HarvestBot/0.1";

/// Where a run keeps the document's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheKind {
    #[default]
    Memory,
    File,
}

impl FromStr for CacheKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "disk" => Ok(Self::File),
            other => Err(format!("expected 'memory' or 'file', got '{other}'")),
        }
    }
}

/// Whether parsed trees are validated before tree extractors see them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Off,
    /// Run rules and report activations, leave the tree untouched.
    Report,
    /// Run rules and apply their fixes.
    Fix,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(Self::Off),
            "report" => Ok(Self::Report),
            "fix" => Ok(Self::Fix),
            other => Err(format!("expected 'off', 'report' or 'fix', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    max_body_bytes: u64,
    connect_timeout: Duration,
    request_timeout: Duration,
    user_agent: String,
    stream_cache: CacheKind,
    detect_content_type: bool,
    validation: ValidationMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            stream_cache: CacheKind::Memory,
            detect_content_type: true,
            validation: ValidationMode::Off,
        }
    }
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_body_bytes: parse_var(ENV_MAX_BODY_BYTES, "max_body_bytes")?
                .unwrap_or(defaults.max_body_bytes),
            connect_timeout: parse_var(ENV_CONNECT_TIMEOUT_SECS, "connect_timeout")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            request_timeout: parse_var(ENV_REQUEST_TIMEOUT_SECS, "request_timeout")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            user_agent: env::var(ENV_USER_AGENT).unwrap_or(defaults.user_agent),
            stream_cache: parse_var(ENV_STREAM_CACHE, "stream_cache")?
                .unwrap_or(defaults.stream_cache),
            detect_content_type: parse_var(ENV_DETECT_CONTENT_TYPE, "detect_content_type")?
                .unwrap_or(defaults.detect_content_type),
            validation: parse_var(ENV_VALIDATION, "validation")?.unwrap_or(defaults.validation),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_body_bytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Upper bound on a fetched document body.
    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
    pub fn stream_cache(&self) -> CacheKind {
        self.stream_cache
    }
    pub fn detect_content_type(&self) -> bool {
        self.detect_content_type
    }
    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    pub fn with_stream_cache(mut self, kind: CacheKind) -> Self {
        self.stream_cache = kind;
        self
    }

    pub fn with_detect_content_type(mut self, detect: bool) -> Self {
        self.detect_content_type = detect;
        self
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }
}

fn parse_var<T>(key: &str, field: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field,
                reason: format!("'{raw}': {}", e.to_string()),
            }),
        Err(_) => Ok(None),
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
