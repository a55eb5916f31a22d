//! # Hydration Error Types
//!
//! Structured error handling for the hydration engine using thiserror.
//!
//! Errors fall into two families, both fatal and never retried internally:
//!
//! - **Configuration errors**: the mapping between a record and an entity type
//!   cannot be established (ambiguous keys, unmapped keys, missing required
//!   constructor arguments, values that cannot be coerced).
//! - **Rebinding errors**: an entity already bound to one provider is asked to
//!   bind to another.

use crate::config::ConfigurationError;
use thiserror::Error;

/// Hydration engine error types
#[derive(Error, Debug)]
pub enum HydrationError {
    #[error("Duplicate key on {entity}: '{first}' and '{second}' both normalize to '{normalized}'")]
    DuplicateKey {
        entity: String,
        normalized: String,
        first: String,
        second: String,
    },

    #[error("Unable to map key '{key}' onto {entity}")]
    UnmappedKey { entity: String, key: String },

    #[error("Parameter '{parameter}' of {entity} is not nullable")]
    NotNullable { entity: String, parameter: String },

    #[error("Missing value for argument {index} ('{parameter}') of {entity}")]
    MissingArgument {
        entity: String,
        parameter: String,
        index: usize,
    },

    #[error("Argument {index} of {entity} is not passed by reference")]
    NotByReference { entity: String, index: usize },

    #[error("Invalid value for '{key}' on {entity}: {message}")]
    InvalidValue {
        entity: String,
        key: String,
        message: String,
    },

    #[error("Invalid date for '{key}' on {entity}: {value}")]
    InvalidDate {
        entity: String,
        key: String,
        value: String,
    },

    #[error("{entity} is already bound to provider {existing}, cannot bind {requested}")]
    Rebinding {
        entity: String,
        existing: String,
        requested: String,
    },

    #[error("{entity} already has service type {existing}, cannot set {requested}")]
    ServiceRebinding {
        entity: String,
        existing: String,
        requested: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl HydrationError {
    /// Create an unmapped key error
    pub fn unmapped_key(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnmappedKey {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Create a not-nullable parameter error
    pub fn not_nullable(entity: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::NotNullable {
            entity: entity.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        entity: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            entity: entity.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// True for errors raised because a record cannot be mapped onto its entity type
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey { .. }
                | Self::UnmappedKey { .. }
                | Self::NotNullable { .. }
                | Self::MissingArgument { .. }
                | Self::NotByReference { .. }
                | Self::InvalidValue { .. }
                | Self::InvalidDate { .. }
                | Self::Configuration(_)
        )
    }

    /// True for write-once binding violations
    pub fn is_rebinding_error(&self) -> bool {
        matches!(self, Self::Rebinding { .. } | Self::ServiceRebinding { .. })
    }
}

/// Error raised by a value decoder or setter, before the engine attaches the
/// entity and key it was raised for.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValueError(pub String);

impl ValueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for ValueError {
    fn from(error: serde_json::Error) -> Self {
        Self(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HydrationError>;
