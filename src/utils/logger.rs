//! Logging utilities
//!
//! Installs a `tracing` subscriber scoped to this crate's targets.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::MapiConfig;

/// Log level configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Filter directive limiting output to this crate
    pub fn directive(self) -> String {
        format!("mapi_client={}", self.to_tracing_level())
    }
}

/// Initialize the logger with specified level
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logger(level: LogLevel) -> bool {
    let filter = EnvFilter::new(level.directive());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

/// Initialize the logger from `config.log_level`, falling back to info
pub fn init_from_config(config: &MapiConfig) -> bool {
    init_logger(LogLevel::parse(&config.log_level).unwrap_or_default())
}
