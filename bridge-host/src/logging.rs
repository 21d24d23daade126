//! Logging setup for applications embedding the bridge.
//!
//! The bridge itself only emits `tracing` events; nothing is printed unless the embedding
//! application installs a subscriber, either its own or the one built here.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{LoggingError, LoggingResult};

/// Configuration for logging output.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter. If None, `RUST_LOG` is used, falling back to INFO.
    pub level: Option<LevelFilter>,
    /// Whether to output logs to console (stderr).
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            console: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = Some(level);
        self
    }

    /// The filter this configuration installs.
    pub fn env_filter(&self) -> EnvFilter {
        match self.level {
            Some(level) => EnvFilter::new(level.to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string())),
        }
    }
}

/// Initialize console-only logging with the given level.
pub fn init_console_logging(level: LevelFilter) -> LoggingResult<()> {
    init_logging(LoggingConfig::default().with_level(level))
}

/// Initialize logging with the given configuration.
///
/// Fails if a global subscriber is already installed. With `console` off nothing is
/// installed and the bridge's events are discarded.
pub fn init_logging(config: LoggingConfig) -> LoggingResult<()> {
    if !config.console {
        return Ok(());
    }

    let console_layer = fmt::layer().with_target(true).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(console_layer)
        .try_init()
        .map_err(|e| LoggingError::SubscriberInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_console_installs_nothing() {
        let config = LoggingConfig {
            level: Some(LevelFilter::DEBUG),
            console: false,
        };
        assert!(init_logging(config).is_ok());
    }

    #[test]
    fn test_explicit_level_wins() {
        let filter = LoggingConfig::default().with_level(LevelFilter::WARN).env_filter();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_second_init_fails() {
        // Whichever call installs the subscriber first, the next one must be refused.
        let _ = init_console_logging(LevelFilter::DEBUG);
        assert!(matches!(init_console_logging(LevelFilter::DEBUG), Err(LoggingError::SubscriberInit(_))));
    }
}
