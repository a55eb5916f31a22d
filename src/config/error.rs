//! Configuration Error Types
//!
//! Errors raised while loading, merging, or validating hydration configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Base configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    /// Source loading or deserialization failure reported by the `config` crate
    #[error("Failed to load configuration from '{source_name}': {error}")]
    LoadError {
        source_name: String,
        #[source]
        error: config::ConfigError,
    },

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn config_file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigFileNotFound { path: path.into() }
    }

    pub fn load_error(source_name: impl Into<String>, error: config::ConfigError) -> Self {
        Self::LoadError {
            source_name: source_name.into(),
            error,
        }
    }

    pub fn missing_required_field<F: Into<String>, C: Into<String>>(field: F, context: C) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    /// Whether the error came from validating otherwise well-formed configuration
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. } | Self::InvalidValue { .. }
        )
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
