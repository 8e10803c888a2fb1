//! Structured logging with tracing
//!
//! Configures the tracing subscriber from [`LoggingConfig`]: an `EnvFilter`
//! seeded from the configured level (overridable via `LENDCORE_LOG`) and
//! either a plain or a JSON fmt layer on stdout.

use lendcore_domain::{Error, Result};
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Initialize logging with the provided configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env("LENDCORE_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

    // The layer types differ, so the two formats need separate branches.
    if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        Registry::default().with(filter).with(stdout).init();
    } else {
        let stdout = fmt::layer().with_target(true);
        Registry::default().with(filter).with(stdout).init();
    }

    info!("Logging initialized with level: {}", level);
    Ok(())
}

/// Parse a log level string to a tracing [`Level`]
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_parse() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    }

    #[test]
    fn unknown_level_is_a_configuration_error() {
        assert!(matches!(
            parse_log_level("verbose").unwrap_err(),
            Error::Configuration { .. }
        ));
    }
}
