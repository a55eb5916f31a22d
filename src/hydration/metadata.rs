//! # Target Metadata
//!
//! Resolution of one record key signature against an entity model.
//!
//! Each record key is normalized and resolved, in precedence order, to:
//!
//! 1. a magic mutator
//! 2. a constructor parameter
//! 3. a declared property
//! 4. the meta slot, if the entity type is extensible
//!
//! A key that resolves to nothing on a non-extensible type, two declared
//! members sharing a normalized name, two record keys claiming one member,
//! and a required parameter no key binds are all configuration errors.

use crate::constants::ReservedKey;
use crate::error::{HydrationError, Result};
use crate::model::EntityModel;
use crate::normalize::Normalizer;
use crate::provider::ProviderType;
use std::collections::{HashMap, HashSet};

/// Where one record key is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTarget {
    /// Constructor parameter at this position
    Parameter(usize),
    /// Entry of the model's `methods`
    Method(usize),
    /// Entry of the model's `properties`
    Property(usize),
    /// Free-form meta slot
    Meta,
}

/// Immutable resolution of a key signature for one entity type and provider type
#[derive(Debug, Clone)]
pub struct TargetMetadata {
    entity: &'static str,
    provider: ProviderType,
    keys: Vec<String>,
    targets: Vec<KeyTarget>,
    parameters: HashMap<String, usize>,
    pass_by_ref_parameters: HashSet<String>,
    not_nullable_parameters: HashSet<String>,
    properties: HashMap<String, usize>,
    methods: HashMap<String, usize>,
    meta_properties: Vec<String>,
    date_properties: HashSet<String>,
    custom_keys: HashMap<ReservedKey, String>,
    last_parameter_index: Option<usize>,
}

impl TargetMetadata {
    /// Resolve `keys` (raw record keys, in record order) against `model`
    pub fn build<E>(model: &EntityModel<E>, keys: Vec<String>, provider: ProviderType) -> Result<Self> {
        let normalizer = model.normalizer;
        let declared_parameters =
            declared(model.name, normalizer, model.parameters.iter().map(|p| p.name))?;
        let declared_properties =
            declared(model.name, normalizer, model.properties.iter().map(|p| p.name))?;
        let declared_methods =
            declared(model.name, normalizer, model.methods.iter().map(|m| m.property))?;

        let mut metadata = Self {
            entity: model.name,
            provider,
            keys: Vec::with_capacity(keys.len()),
            targets: Vec::with_capacity(keys.len()),
            parameters: HashMap::new(),
            pass_by_ref_parameters: HashSet::new(),
            not_nullable_parameters: HashSet::new(),
            properties: HashMap::new(),
            methods: HashMap::new(),
            meta_properties: Vec::new(),
            date_properties: HashSet::new(),
            custom_keys: model
                .custom_keys
                .iter()
                .map(|(role, key)| (*role, normalizer(key)))
                .collect(),
            last_parameter_index: None,
        };

        // normalized name -> raw key that claimed it
        let mut claimed: HashMap<String, String> = HashMap::new();

        for key in keys {
            let normalized = normalizer(&key);

            let target = if let Some(&index) = declared_methods.get(&normalized) {
                if model.methods[index].setter.is_date() {
                    metadata.date_properties.insert(normalized.clone());
                }
                metadata.methods.insert(normalized.clone(), index);
                KeyTarget::Method(index)
            } else if let Some(&index) = declared_parameters.get(&normalized) {
                let parameter = &model.parameters[index];
                if parameter.by_ref {
                    metadata.pass_by_ref_parameters.insert(normalized.clone());
                }
                if !parameter.nullable {
                    metadata.not_nullable_parameters.insert(normalized.clone());
                }
                metadata.parameters.insert(normalized.clone(), index);
                metadata.last_parameter_index = metadata.last_parameter_index.max(Some(index));
                KeyTarget::Parameter(index)
            } else if let Some(&index) = declared_properties.get(&normalized) {
                if model.properties[index].setter.is_date() {
                    metadata.date_properties.insert(normalized.clone());
                }
                metadata.properties.insert(normalized.clone(), index);
                KeyTarget::Property(index)
            } else if model.is_extensible() {
                metadata.meta_properties.push(key.clone());
                KeyTarget::Meta
            } else {
                return Err(HydrationError::unmapped_key(model.name, key));
            };

            if target != KeyTarget::Meta {
                if let Some(first) = claimed.get(&normalized) {
                    return Err(HydrationError::DuplicateKey {
                        entity: model.name.to_string(),
                        normalized,
                        first: first.clone(),
                        second: key,
                    });
                }
                claimed.insert(normalized, key.clone());
            }

            metadata.keys.push(key);
            metadata.targets.push(target);
        }

        let bound: HashSet<usize> = metadata.parameters.values().copied().collect();
        if let Some(parameter) = model
            .parameters
            .iter()
            .enumerate()
            .find(|(index, parameter)| parameter.is_required() && !bound.contains(index))
            .map(|(_, parameter)| parameter)
        {
            return Err(HydrationError::not_nullable(model.name, parameter.name));
        }

        Ok(metadata)
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn provider(&self) -> ProviderType {
        self.provider
    }

    /// Raw record keys in the order the signature was built from
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Targets aligned with [`TargetMetadata::keys`]
    pub fn targets(&self) -> &[KeyTarget] {
        &self.targets
    }

    pub fn parameters(&self) -> &HashMap<String, usize> {
        &self.parameters
    }

    pub fn pass_by_ref_parameters(&self) -> &HashSet<String> {
        &self.pass_by_ref_parameters
    }

    pub fn not_nullable_parameters(&self) -> &HashSet<String> {
        &self.not_nullable_parameters
    }

    pub fn properties(&self) -> &HashMap<String, usize> {
        &self.properties
    }

    pub fn methods(&self) -> &HashMap<String, usize> {
        &self.methods
    }

    /// Raw keys routed to the meta slot
    pub fn meta_properties(&self) -> &[String] {
        &self.meta_properties
    }

    pub fn date_properties(&self) -> &HashSet<String> {
        &self.date_properties
    }

    /// Normalized key reserved for `role`
    pub fn custom_key(&self, role: ReservedKey) -> Option<&str> {
        self.custom_keys.get(&role).map(String::as_str)
    }

    /// Highest bound parameter position
    pub fn last_parameter_index(&self) -> Option<usize> {
        self.last_parameter_index
    }

    /// Number of positional arguments a binder synthesizes
    pub fn parameter_count(&self) -> usize {
        self.last_parameter_index.map_or(0, |index| index + 1)
    }
}

/// Map normalized declared names to their positions, failing on collisions
fn declared<'a>(
    entity: &str,
    normalizer: Normalizer,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>> {
    let mut map: HashMap<String, (usize, &str)> = HashMap::new();
    for (index, name) in names.enumerate() {
        let normalized = normalizer(name);
        if let Some((_, first)) = map.get(&normalized) {
            return Err(HydrationError::DuplicateKey {
                entity: entity.to_string(),
                normalized,
                first: (*first).to_string(),
                second: name.to_string(),
            });
        }
        map.insert(normalized, (index, name));
    }
    Ok(map.into_iter().map(|(k, (index, _))| (k, index)).collect())
}
