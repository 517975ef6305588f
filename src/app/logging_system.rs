use super::config::LogLevel;
use parking_lot::RwLock;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log level '{input}'")]
    InvalidLogLevel { input: String },

    #[error("Invalid directive format '{input}'. Expected: 'target=level'")]
    InvalidDirectiveFormat { input: String },

    #[error("Empty target in directive '{input}'")]
    EmptyTarget { input: String },

    #[error("Logging system initialization failed: {details}")]
    InitFailed {
        details: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDirective {
    pub target: String,
    pub level: LogLevel,
}

impl LogDirective {
    pub fn new(target: impl Into<String>, level: LogLevel) -> Self {
        Self {
            target: target.into(),
            level,
        }
    }

    pub fn parse(directive: &str) -> Result<Self, LoggingError> {
        let Some((target, level)) = directive.split_once('=') else {
            return Err(LoggingError::InvalidDirectiveFormat {
                input: directive.to_string(),
            });
        };

        let target = target.trim();
        if target.is_empty() {
            return Err(LoggingError::EmptyTarget {
                input: directive.to_string(),
            });
        }

        let level = LogLevel::from_str(level.trim()).map_err(|_| LoggingError::InvalidLogLevel {
            input: level.trim().to_string(),
        })?;

        Ok(LogDirective::new(target, level))
    }

    pub fn to_filter_string(&self) -> String {
        format!("{}={}", self.target, self.level.as_str())
    }
}

/// Builds the `EnvFilter` for the reporter binary.
///
/// Malformed directives never abort startup: a directive with an unknown
/// level falls back to the default level, anything else is skipped.
pub struct LoggingSystem {
    directives: RwLock<Vec<LogDirective>>,
    fallback_level: LogLevel,
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: RwLock::new(Vec::new()),
            fallback_level: LogLevel::Warn,
        }
    }

    pub fn add_directive(&self, directive_str: &str) -> Result<(), LoggingError> {
        match LogDirective::parse(directive_str) {
            Ok(directive) => {
                self.directives.write().push(directive);
                Ok(())
            }
            Err(LoggingError::InvalidLogLevel { .. }) => {
                eprintln!("Warning: invalid level in '{directive_str}', using default level");
                let target = directive_str.split('=').next().unwrap_or_default().trim();
                self.directives
                    .write()
                    .push(LogDirective::new(target, self.fallback_level));
                Ok(())
            }
            Err(e @ (LoggingError::InvalidDirectiveFormat { .. } | LoggingError::EmptyTarget { .. })) => {
                eprintln!("Warning: {e}, skipping directive");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Quiets the HTTP stack underneath the ingress client.
    pub fn add_default_directives(&self) {
        let mut directives = self.directives.write();
        for target in ["hyper", "hyper_util", "reqwest", "h2"] {
            directives.push(LogDirective::new(target, LogLevel::Warn));
        }
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();

        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        filter_parts.push(default_level.as_str().to_string());
        filter_parts.extend(directives.iter().map(LogDirective::to_filter_string));

        filter_parts.join(",")
    }

    pub fn initialize_tracing(&self, default_level: LogLevel) -> Result<(), LoggingError> {
        let filter_string = self.build_filter_string(default_level);

        let env_filter =
            EnvFilter::try_new(&filter_string).map_err(|e| LoggingError::InitFailed {
                details: format!("Failed to create EnvFilter with '{filter_string}'"),
                source: Box::new(e),
            })?;

        let subscriber = tracing_subscriber::registry().with(env_filter).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .compact(),
        );

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            LoggingError::InitFailed {
                details: "Failed to set global tracing subscriber".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(())
    }
}

/// Installs the global subscriber for the CLI. Never panics.
pub fn setup_logging_safe(level: LogLevel) -> Result<(), LoggingError> {
    let logging_system = LoggingSystem::new();
    logging_system.add_default_directives();

    if let Ok(extra) = std::env::var("GREENER_LOG_DIRECTIVES") {
        for directive in extra.split(',').filter(|d| !d.is_empty()) {
            logging_system.add_directive(directive)?;
        }
    }

    logging_system.initialize_tracing(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_directive_parse() {
        assert_eq!(
            LogDirective::parse("greener_reporter=debug").unwrap(),
            LogDirective::new("greener_reporter", LogLevel::Debug)
        );
        assert!(matches!(
            LogDirective::parse("invalid"),
            Err(LoggingError::InvalidDirectiveFormat { .. })
        ));
        assert!(matches!(
            LogDirective::parse("=info"),
            Err(LoggingError::EmptyTarget { .. })
        ));
        assert!(matches!(
            LogDirective::parse("hyper=loud"),
            Err(LoggingError::InvalidLogLevel { .. })
        ));
    }

    #[test]
    fn test_fallback_strategies() {
        let logging_system = LoggingSystem::new();

        let test_cases = vec![
            ("hyper=warn", 1),           // Valid
            ("invalid_format", 1),       // Skipped
            ("target=invalid_level", 2), // Default level
            ("=empty", 2),               // Skipped
            ("", 2),                     // Skipped
        ];

        for (directive, expected_count) in test_cases {
            assert!(logging_system.add_directive(directive).is_ok(), "Directive: {directive}");
            assert_eq!(
                logging_system.directive_count(),
                expected_count,
                "Directive: {directive}"
            );
        }

        let filter = logging_system.build_filter_string(LogLevel::Info);
        assert_eq!(filter, "info,hyper=warn,target=warn");
    }

    #[test]
    fn test_build_filter_string() {
        let logging_system = LoggingSystem::new();
        assert_eq!(logging_system.build_filter_string(LogLevel::Warn), "warn");

        logging_system.add_default_directives();
        let filter = logging_system.build_filter_string(LogLevel::Debug);
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("reqwest=warn"));
        assert!(filter.contains("hyper=warn"));
    }

    #[test]
    fn test_concurrent_directive_modification() {
        let logging_system = Arc::new(LoggingSystem::new());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let logging_system = logging_system.clone();
                thread::spawn(move || logging_system.add_directive(&format!("target{i}=info")))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        assert_eq!(logging_system.directive_count(), 50);
    }
}
