use crate::constants::ReservedKey;
use crate::error::{Result, ValueError};
use crate::model::{Arguments, MetaProperties};
use crate::normalize::{normalize, Normalizer};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

///
/// ParameterModel
/// One constructor parameter; its position is its declaration order.
///

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterModel {
    pub name: &'static str,
    /// Whether `null` (or absence) is an acceptable value
    pub nullable: bool,
    /// Whether the constructor supplies its own value when none is bound
    pub has_default: bool,
    /// Whether the constructor receives a writable slot instead of a value
    pub by_ref: bool,
}

impl ParameterModel {
    /// A parameter that must be bound to a non-null value
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            nullable: false,
            has_default: false,
            by_ref: false,
        }
    }

    /// A parameter that accepts `null` or absence
    pub const fn nullable(name: &'static str) -> Self {
        Self {
            name,
            nullable: true,
            has_default: false,
            by_ref: false,
        }
    }

    /// A not-nullable parameter the constructor defaults when unbound
    pub const fn with_default(name: &'static str) -> Self {
        Self {
            name,
            nullable: false,
            has_default: true,
            by_ref: false,
        }
    }

    /// Mark the parameter as pass-by-reference
    #[must_use]
    pub const fn by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Whether leaving the parameter unbound is a configuration error
    pub const fn is_required(&self) -> bool {
        !self.nullable && !self.has_default
    }
}

///
/// Setter
/// Assignment handler for a property or magic mutator, resolved once per type.
///

pub enum Setter<E> {
    /// Assign the raw record value
    Value(fn(&mut E, Value) -> std::result::Result<(), ValueError>),
    /// Assign the value after date/time coercion
    Date(fn(&mut E, Option<DateTime<Utc>>) -> std::result::Result<(), ValueError>),
}

impl<E> Setter<E> {
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl<E> Clone for Setter<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Setter<E> {}

impl<E> fmt::Debug for Setter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => write!(f, "Setter::Value"),
            Self::Date(_) => write!(f, "Setter::Date"),
        }
    }
}

/// A declared, directly assignable property
pub struct PropertyModel<E> {
    pub name: &'static str,
    pub setter: Setter<E>,
}

/// A magic mutator mediating writes to a property name
pub struct MethodModel<E> {
    /// Property name the mutator is keyed by
    pub property: &'static str,
    /// Method identifier, for diagnostics
    pub method: &'static str,
    pub setter: Setter<E>,
}

// Manual impls: the models are copyable whatever `E` is.
impl<E> Clone for PropertyModel<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for PropertyModel<E> {}

impl<E> fmt::Debug for PropertyModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyModel")
            .field("name", &self.name)
            .field("setter", &self.setter)
            .finish()
    }
}

impl<E> Clone for MethodModel<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for MethodModel<E> {}

impl<E> fmt::Debug for MethodModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodModel")
            .field("property", &self.property)
            .field("method", &self.method)
            .field("setter", &self.setter)
            .finish()
    }
}

/// Constructor invoked with the bound positional arguments
pub type Constructor<E> = fn(&mut Arguments) -> Result<E>;

/// Accessor for the free-form property slot of an extensible entity
pub type MetaAccessor<E> = fn(&mut E) -> &mut MetaProperties;

///
/// EntityModel
/// Static description of one entity type's hydratable surface.
///

pub struct EntityModel<E> {
    /// Stable type name used in diagnostics
    pub name: &'static str,
    /// Ordered constructor parameters
    pub parameters: Vec<ParameterModel>,
    pub properties: Vec<PropertyModel<E>>,
    pub methods: Vec<MethodModel<E>>,
    /// Present exactly when the type is extensible
    pub meta: Option<MetaAccessor<E>>,
    pub custom_keys: Vec<(ReservedKey, &'static str)>,
    pub constructor: Constructor<E>,
    pub normalizer: Normalizer,
}

impl<E> EntityModel<E> {
    pub fn new(name: &'static str, constructor: Constructor<E>) -> Self {
        Self {
            name,
            parameters: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            meta: None,
            custom_keys: Vec::new(),
            constructor,
            normalizer: normalize,
        }
    }

    #[must_use]
    pub fn parameter(mut self, parameter: ParameterModel) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn property(mut self, name: &'static str, setter: Setter<E>) -> Self {
        self.properties.push(PropertyModel { name, setter });
        self
    }

    #[must_use]
    pub fn method(mut self, property: &'static str, method: &'static str, setter: Setter<E>) -> Self {
        self.methods.push(MethodModel {
            property,
            method,
            setter,
        });
        self
    }

    /// Make the type extensible: unmatched keys land in the returned slot
    #[must_use]
    pub fn extensible(mut self, accessor: MetaAccessor<E>) -> Self {
        self.meta = Some(accessor);
        self
    }

    #[must_use]
    pub fn custom_key(mut self, role: ReservedKey, key: &'static str) -> Self {
        self.custom_keys.push((role, key));
        self
    }

    #[must_use]
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub const fn is_extensible(&self) -> bool {
        self.meta.is_some()
    }
}

impl<E> fmt::Debug for EntityModel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .field("extensible", &self.is_extensible())
            .field("custom_keys", &self.custom_keys)
            .finish_non_exhaustive()
    }
}
