//! Configuration Loader
//!
//! Environment-aware loading built on the `config` crate. Sources are merged in
//! order, later sources winning:
//!
//! 1. the base file (`hydrator.toml`, `hydrator.yaml`, `hydrator.json`, ...)
//! 2. an optional environment overlay next to it (`hydrator.<environment>.toml`)
//! 3. `HYDRATOR__SECTION__KEY` environment variables

use super::error::{ConfigResult, ConfigurationError};
use super::HydrationConfig;
use crate::constants::{CONFIG_ENV_PREFIX, ENVIRONMENT_VAR, FALLBACK_ENVIRONMENT_VAR};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Loaded, validated configuration plus where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: HydrationConfig,
    environment: String,
    source_path: PathBuf,
    overlay_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `path` for `environment`
    pub fn load_from_file(
        path: impl AsRef<Path>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_file_with_prefix(path, environment, CONFIG_ENV_PREFIX)
    }

    /// Load configuration reading environment overrides under `prefix`
    ///
    /// Useful for tests that must not see the process's `HYDRATOR__*` variables.
    pub fn load_from_file_with_prefix(
        path: impl AsRef<Path>,
        environment: &str,
        prefix: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigurationError::config_file_not_found(path));
        }

        let overlay = Self::overlay_for(path, environment).filter(|overlay| overlay.is_file());

        debug!(
            environment = %environment,
            path = %path.display(),
            overlay = ?overlay,
            "Loading hydration configuration"
        );

        let mut builder = Config::builder().add_source(File::from(path).required(true));
        if let Some(overlay) = &overlay {
            builder = builder.add_source(File::from(overlay.as_path()).required(true));
        }
        builder = builder.add_source(environment_source(prefix));

        let source_name = path.display().to_string();
        let config: HydrationConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ConfigurationError::load_error(source_name, e))?;

        config.validate()?;

        debug!(
            environment = %environment,
            cache_enabled = config.cache.enabled,
            max_binders = config.cache.max_binders,
            date_formats = config.dates.formats.len(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            source_path: path.to_path_buf(),
            overlay_path: overlay,
        }))
    }

    pub fn config(&self) -> &HydrationConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// The environment overlay, if one was found and merged
    pub fn overlay_path(&self) -> Option<&Path> {
        self.overlay_path.as_deref()
    }

    /// Detect current environment: HYDRATOR_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var(ENVIRONMENT_VAR)
            .or_else(|_| env::var(FALLBACK_ENVIRONMENT_VAR))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    /// `<dir>/<stem>.<environment>.<ext>` for `<dir>/<stem>.<ext>`
    fn overlay_for(path: &Path, environment: &str) -> Option<PathBuf> {
        let stem = path.file_stem()?.to_str()?;
        let name = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{stem}.{environment}.{ext}"),
            None => format!("{stem}.{environment}"),
        };
        Some(path.with_file_name(name))
    }
}

/// Layer `<prefix>__SECTION__KEY` environment variables over `base`
pub fn apply_environment_overrides(
    base: &HydrationConfig,
    prefix: &str,
) -> ConfigResult<HydrationConfig> {
    let defaults =
        Config::try_from(base).map_err(|e| ConfigurationError::load_error("preset", e))?;

    Config::builder()
        .add_source(defaults)
        .add_source(environment_source(prefix))
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ConfigurationError::load_error(format!("{prefix}__* environment"), e))
}

fn environment_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .separator("__")
        .try_parsing(true)
}
