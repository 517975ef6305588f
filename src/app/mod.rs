pub mod cli;
pub mod config;
pub mod logging_system;
pub mod reporter;

pub use cli::{Cli, Commands, CreateCommands, run};
pub use config::{ConfigError, LogLevel, ReporterConfig};
pub use logging_system::{LoggingError, LoggingSystem, setup_logging_safe};
pub use reporter::Reporter;
