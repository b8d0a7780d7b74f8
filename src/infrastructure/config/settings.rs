//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; `POLYSTORE_SEED` and
//! `POLYSTORE_LOAD_MODE` in the environment override the file.
//!
//! # Example
//!
//! ```no_run
//! use polystore::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::application::{IngestPolicy, LoadMode};
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`GenerationConfig::seed`].
pub const SEED_ENV: &str = "POLYSTORE_SEED";
/// Environment variable overriding [`LoadConfig::mode`].
pub const LOAD_MODE_ENV: &str = "POLYSTORE_LOAD_MODE";

/// Locations of the three input tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    pub users: PathBuf,
    pub restaurants: PathBuf,
    pub zones: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            users: PathBuf::from("data/usuarios.csv"),
            restaurants: PathBuf::from("data/restaurantes.csv"),
            zones: PathBuf::from("data/zonas.csv"),
        }
    }
}

/// Relationship generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Fixed RNG seed. Absent means a fresh entropy-seeded graph every run.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    pub policy: IngestPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadConfig {
    pub mode: LoadMode,
}

/// Wide-column keyspace settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub keyspace: String,
    pub replication_factor: u32,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            keyspace: "polystore".into(),
            replication_factor: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub database: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            database: "polystore".into(),
        }
    }
}

/// Main application configuration.
///
/// Every section is optional; a missing section takes its defaults. Load
/// from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Input CSV paths.
    pub data: DataConfig,

    /// Relationship generation.
    pub generation: GenerationConfig,

    /// Handling of malformed input rows.
    pub ingest: IngestConfig,

    /// Behaviour of a load into a store that already holds data.
    pub load: LoadConfig,

    /// Wide-column keyspace.
    pub column: ColumnConfig,

    /// Document database.
    pub document: DocumentConfig,

    /// Logging and tracing configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides,
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An environment override does not parse
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Apply the `POLYSTORE_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    #[allow(clippy::result_large_err)]
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = value(SEED_ENV) {
            let seed = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: SEED_ENV,
                reason: format!("`{raw}` is not an unsigned integer"),
            })?;
            self.generation.seed = Some(seed);
        }

        if let Some(raw) = value(LOAD_MODE_ENV) {
            self.load.mode = match raw.trim().to_lowercase().as_str() {
                "append" => LoadMode::Append,
                "reject_if_non_empty" => LoadMode::RejectIfNonEmpty,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: LOAD_MODE_ENV,
                        reason: format!("`{raw}` is not append or reject_if_non_empty"),
                    }
                    .into())
                }
            };
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// The first field found empty or out of range.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("data.users", &self.data.users),
            ("data.restaurants", &self.data.restaurants),
            ("data.zones", &self.data.zones),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingField { field }.into());
            }
        }

        if self.column.keyspace.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "column.keyspace",
            }
            .into());
        }
        if !self
            .column
            .keyspace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                field: "column.keyspace",
                reason: "must contain only letters, digits and underscores".to_string(),
            }
            .into());
        }
        if self.column.replication_factor == 0 {
            return Err(ConfigError::InvalidValue {
                field: "column.replication_factor",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.document.database.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "document.database",
            }
            .into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be pretty or json".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
