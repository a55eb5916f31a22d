//! proptest strategies for hydration property tests

#![allow(dead_code)]

use proptest::prelude::*;
use serde_json::Value;

/// Lower-snake identifiers, the canonical form of a declared member name
pub fn snake_identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,8}(_[a-z]{2,8}){0,2}"
}

/// Display names for people
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,15}( [A-Z][a-z]{0,15})?"
}

pub fn age_strategy() -> impl Strategy<Value = Option<u32>> {
    prop::option::of(0u32..130)
}

/// Scalar JSON values
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
    ]
}

/// Extra keys that cannot collide with the `Contact` fixture's declared `name`
pub fn extra_fields_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map(
        "x_[a-z]{1,8}",
        scalar_value_strategy(),
        0..6,
    )
    .prop_map(|fields| fields.into_iter().collect())
}

/// Rewrite a snake identifier in one of the spellings callers send
pub fn respell(identifier: &str, style: u8) -> String {
    let words: Vec<&str> = identifier.split('_').collect();
    match style % 4 {
        0 => identifier.to_string(),
        1 => words.join("-"),
        2 => words
            .iter()
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect(),
        _ => identifier.to_uppercase(),
    }
}
