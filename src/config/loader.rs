//! Configuration loader for chirp-client.
//!
//! Handles loading configuration from multiple sources with proper
//! precedence.

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "CHIRP_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "CHIRP_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "CHIRP";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading.
///
/// Sources, in order of priority:
/// 1. `default.toml` - base configuration (optional, defaults apply)
/// 2. `local.toml` - local overrides (optional)
/// 3. `CHIRP__*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if both `CHIRP_CONFIG_DIR` and `CHIRP_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::mutual_exclusivity(
                "CHIRP_CONFIG_DIR and CHIRP_CONFIG_FILE cannot both be set. \
                 Use CHIRP_CONFIG_DIR for layered configuration or \
                 CHIRP_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self {
            config_dir,
            config_file,
        })
    }

    /// Create a loader reading one specific file, bypassing layered loading.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
        }
    }

    /// Load and validate settings from all sources.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();

        if let Some(file) = &self.config_file {
            builder = builder.add_source(
                File::from(file.clone())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        } else {
            builder = builder
                .add_source(
                    File::from(self.config_dir.join("default.toml"))
                        .format(FileFormat::Toml)
                        .required(false),
                )
                .add_source(
                    File::from(self.config_dir.join("local.toml"))
                        .format(FileFormat::Toml)
                        .required(false),
                );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
