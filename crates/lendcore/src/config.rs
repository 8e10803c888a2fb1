//! Configuration loading
//!
//! Sources are merged with Figment in this order (later overrides earlier):
//! defaults from the `Default` impls, a TOML file, then environment
//! variables prefixed `LENDCORE_` (e.g. `LENDCORE_LOGGING_LEVEL=debug`).

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use lendcore_domain::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "LENDCORE";

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILENAME: &str = "lendcore.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Demo scenario configuration for the `run` command
    pub demo: DemoConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Parameters for the demo loan driven by `lendcore run`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Client name on the demo application
    pub client: String,

    /// ISO 4217 currency code
    pub currency: String,

    /// Principal in minor units
    pub principal_minor: i64,

    /// Repayment term in months
    pub term_months: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            client: "demo-client".to_string(),
            currency: "USD".to_string(),
            principal_minor: 120_000,
            term_months: 12,
        }
    }
}

/// Configuration loader service
#[derive(Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(config_path) => {
                if config_path.exists() {
                    figment = figment.merge(Toml::file(config_path));
                    info!("Configuration loaded from {}", config_path.display());
                } else {
                    warn!("Configuration file not found: {}", config_path.display());
                }
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(&default_path));
                    info!("Configuration loaded from {}", default_path.display());
                }
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        let config: AppConfig = figment.extract().map_err(|e| Error::Configuration {
            message: "failed to extract configuration".to_string(),
            source: Some(Box::new(e)),
        })?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| Error::Configuration {
            message: "failed to serialize configuration to TOML".to_string(),
            source: Some(Box::new(e)),
        })?;
        std::fs::write(path.as_ref(), toml_string)?;
        Ok(())
    }

    /// The configured file path, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_config(config: &AppConfig) -> Result<()> {
    crate::logging::parse_log_level(&config.logging.level)?;
    if config.demo.principal_minor <= 0 {
        return Err(Error::configuration("demo.principal_minor must be positive"));
    }
    if config.demo.term_months == 0 {
        return Err(Error::configuration(
            "demo.term_months must be at least one month",
        ));
    }
    Ok(())
}
