//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! hydration engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable selecting the configuration preset
pub const ENVIRONMENT_VAR: &str = "HYDRATOR_ENV";

/// Fallback environment variable consulted when [`ENVIRONMENT_VAR`] is unset
pub const FALLBACK_ENVIRONMENT_VAR: &str = "APP_ENV";

/// Prefix for configuration overrides, e.g. `HYDRATOR__CACHE__ENABLED=false`
pub const CONFIG_ENV_PREFIX: &str = "HYDRATOR";

/// Formats tried, in order, when coercing a string to a date/time
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d",
];

/// Caller-declared guarantee about key-shape uniformity across a batch of records
///
/// Levels are totally ordered `None < Partial < Complete`; when two levels
/// apply to one operation the stricter (greater) one wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Conformity {
    /// Records may have arbitrarily different key sets
    #[default]
    None,
    /// Records expose the same keys, not necessarily in the same order
    Partial,
    /// Records expose the same keys in the same order
    Complete,
}

impl Conformity {
    /// The stricter of two conformity levels
    pub fn stricter(self, other: Self) -> Self {
        self.max(other)
    }

    /// Whether one binder may be reused for every record of a batch
    pub fn reuses_binder(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for Conformity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

impl std::str::FromStr for Conformity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "partial" => Ok(Self::Partial),
            "complete" => Ok(Self::Complete),
            _ => Err(format!("Invalid conformity: {s}")),
        }
    }
}

/// Implementation-level key roles an entity type may reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedKey {
    /// The record key carrying the entity's primary identifier
    Id,
    /// The record key carrying the entity's parent identifier
    ParentId,
    /// The record key carrying child records
    Children,
}

impl fmt::Display for ReservedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::ParentId => write!(f, "parent_id"),
            Self::Children => write!(f, "children"),
        }
    }
}
