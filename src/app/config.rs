use crate::buffer::BatcherConfig;
use crate::domain::ReporterError;
use crate::sender::ClientConfig;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_ENDPOINT: &str = "GREENER_INGRESS_ENDPOINT";
pub const ENV_API_KEY: &str = "GREENER_INGRESS_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

impl From<ConfigError> for ReporterError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidConfig(message) => ReporterError::InvalidArgument(message),
            other => ReporterError::InvalidArgument(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::EnvError(format!("Invalid log level: {s}"))),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Greener ingress endpoint URL
    #[arg(long, env = ENV_ENDPOINT, default_value = "")]
    pub endpoint: String,

    /// API key for authentication
    #[arg(long, env = ENV_API_KEY, default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Number of test cases per batch
    #[arg(long, env = "GREENER_BATCH_SIZE", default_value = "100")]
    pub batch_size: usize,

    /// Flush interval for partial batches in milliseconds
    #[arg(long, env = "GREENER_FLUSH_INTERVAL_MS", default_value = "5000")]
    pub flush_interval_ms: u64,

    /// Test cases the intake queue holds before rejecting new ones
    #[arg(long, env = "GREENER_QUEUE_CAPACITY", default_value = "100")]
    pub queue_capacity: usize,

    /// Timeout for a single ingress request in seconds
    #[arg(long, env = "GREENER_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// How long shutdown waits for pending test cases in seconds (0 waits indefinitely)
    #[arg(long, env = "GREENER_SHUTDOWN_TIMEOUT_SECS", default_value = "60")]
    pub shutdown_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "GREENER_LOG_LEVEL", default_value = "warn")]
    pub log_level: LogLevel,

    /// Configuration file path (optional)
    #[arg(long, env = "GREENER_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            batch_size: 100,
            flush_interval_ms: 5000,
            queue_capacity: 100,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 60,
            log_level: LogLevel::Warn,
            config_file: None,
        }
    }
}

impl ReporterConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = ReporterConfig::default();

        load_env_string(ENV_ENDPOINT, &mut config.endpoint);
        load_env_string(ENV_API_KEY, &mut config.api_key);
        load_env_var("GREENER_BATCH_SIZE", &mut config.batch_size)?;
        load_env_var("GREENER_FLUSH_INTERVAL_MS", &mut config.flush_interval_ms)?;
        load_env_var("GREENER_QUEUE_CAPACITY", &mut config.queue_capacity)?;
        load_env_var(
            "GREENER_REQUEST_TIMEOUT_SECS",
            &mut config.request_timeout_secs,
        )?;
        load_env_var(
            "GREENER_SHUTDOWN_TIMEOUT_SECS",
            &mut config.shutdown_timeout_secs,
        )?;
        load_env_var("GREENER_LOG_LEVEL", &mut config.log_level)?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ReporterConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "endpoint cannot be empty".to_string(),
            ));
        }

        if self.api_key.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "api_key cannot be empty".to_string(),
            ));
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidConfig(
                "Batch size must be greater than 0".to_string(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.flush_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Flush interval must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        match self.shutdown_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::default()
        }
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            max_batch_size: self.batch_size,
            batch_timeout: self.flush_interval(),
            queue_capacity: self.queue_capacity,
            shutdown_timeout: self.shutdown_timeout(),
        }
    }
}

/// Helper function to load and parse an environment variable.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(value) = std::env::var(name) {
        *target = value
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {name}: {e}")))?;
    }
    Ok(())
}

fn load_env_string(name: &str, target: &mut String) {
    if let Ok(value) = std::env::var(name) {
        *target = value;
    }
}
