//! # Hydration Configuration
//!
//! Settings for the binder cache, date coercion, and logging.
//!
//! ## Sources
//!
//! - **Presets**: [`HydrationConfig::default`], [`HydrationConfig::for_test`],
//!   [`HydrationConfig::for_development`]
//! - **Environment**: [`HydrationConfig::from_environment`] picks a preset from
//!   `HYDRATOR_ENV` (or `APP_ENV`) and applies `HYDRATOR__SECTION__KEY` overrides
//! - **Files**: [`ConfigManager::load_from_file`] merges a base file, an optional
//!   `<stem>.<environment>.<ext>` overlay, and environment overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use entity_hydrator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load_from_file("config/hydrator.toml", "production")?;
//! let max_binders = manager.config().cache.max_binders;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{CONFIG_ENV_PREFIX, DEFAULT_DATE_FORMATS};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root hydration configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HydrationConfig {
    /// Binder cache settings
    pub cache: CacheConfig,

    /// Date coercion settings
    pub dates: DateConfig,

    /// Structured logging settings
    pub logging: LoggingConfig,
}

/// Binder cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When false every hydration compiles a fresh binder
    pub enabled: bool,
    /// Upper bound on retained binders across all entity types
    pub max_binders: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_binders: 10_000,
        }
    }
}

/// Date coercion configuration
///
/// `formats` are `chrono` format strings tried in order after RFC 3339.
/// Naive results are read as UTC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DateConfig {
    pub formats: Vec<String>,
    /// Accept integers as Unix timestamps in seconds
    pub accept_timestamps: bool,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            formats: DEFAULT_DATE_FORMATS.iter().map(|f| (*f).to_string()).collect(),
            accept_timestamps: true,
        }
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl HydrationConfig {
    /// Small cache and verbose logging for test runs
    pub fn for_test() -> Self {
        Self {
            cache: CacheConfig {
                enabled: true,
                max_binders: 1_000,
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
            ..Self::default()
        }
    }

    pub fn for_development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
            ..Self::default()
        }
    }

    /// Preset for a named environment; unknown names get the defaults
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "test" => Self::for_test(),
            "development" => Self::for_development(),
            _ => Self::default(),
        }
    }

    /// Preset for the detected environment with `HYDRATOR__*` overrides applied
    ///
    /// Invalid overrides are logged and ignored.
    pub fn from_environment() -> Self {
        let environment = ConfigManager::detect_environment();
        let preset = Self::for_environment(&environment);

        match loader::apply_environment_overrides(&preset, CONFIG_ENV_PREFIX)
            .and_then(|config| config.validate().map(|()| config))
        {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    environment = %environment,
                    error = %e,
                    "Ignoring invalid environment configuration overrides"
                );
                preset
            }
        }
    }

    /// Validate configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.cache.enabled && self.cache.max_binders == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.max_binders",
                "0",
                "must be greater than 0 when caching is enabled",
            ));
        }

        if self.dates.formats.is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "dates.formats",
                "date configuration",
            ));
        }

        if let Some(blank) = self.dates.formats.iter().find(|f| f.trim().is_empty()) {
            return Err(ConfigurationError::invalid_value(
                "dates.formats",
                blank.clone(),
                "formats must not be blank",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "logging.level",
                "logging configuration",
            ));
        }

        Ok(())
    }
}
