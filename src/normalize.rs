//! # Key Normalizer
//!
//! Maps property, parameter and record key names to one canonical comparison
//! form (lower snake case) so that `FirstName`, `first_name`, `first-name` and
//! `first name` all compare equal.

use convert_case::{Case, Casing};

/// Signature of a key normalizer; entity types may register their own
pub type Normalizer = fn(&str) -> String;

/// Normalize a key to lower snake case
pub fn normalize(name: &str) -> String {
    name.trim().to_case(Case::Snake)
}
