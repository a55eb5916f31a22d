//! # Entity Models
//!
//! Static descriptions of hydratable entity types.
//!
//! ## Overview
//!
//! An entity type registers its hydratable surface once, by implementing
//! [`Entity::describe`]. The returned [`EntityModel`] lists:
//!
//! - constructor parameters, in positional order, with their nullability,
//!   default and pass-by-reference flags
//! - directly assignable properties
//! - magic mutators, which take precedence over properties of the same name
//! - an optional free-form [`MetaProperties`] slot making the type extensible
//! - reserved key roles such as the primary identifier
//!
//! Every handler is a plain function pointer, so hydration never inspects the
//! type at runtime beyond reading this table.
//!
//! ## Usage
//!
//! ```rust
//! use entity_hydrator::model::{decode, Arguments, Entity, EntityModel, ParameterModel, Setter};
//! use entity_hydrator::providable::ProviderBinding;
//!
//! struct Person {
//!     name: String,
//!     age: Option<u32>,
//!     binding: ProviderBinding,
//! }
//!
//! impl Entity for Person {
//!     fn describe() -> EntityModel<Self> {
//!         EntityModel::new("Person", |args: &mut Arguments| {
//!             Ok(Person {
//!                 name: args.value(0)?,
//!                 age: None,
//!                 binding: ProviderBinding::default(),
//!             })
//!         })
//!         .parameter(ParameterModel::required("name"))
//!         .property("age", Setter::Value(|person: &mut Person, value| {
//!             person.age = decode(value)?;
//!             Ok(())
//!         }))
//!     }
//!
//!     fn binding(&self) -> &ProviderBinding {
//!         &self.binding
//!     }
//!
//!     fn binding_mut(&mut self) -> &mut ProviderBinding {
//!         &mut self.binding
//!     }
//! }
//! ```

pub mod arguments;
pub mod entity;
pub mod meta;

pub use arguments::Arguments;
pub use entity::{
    Constructor, EntityModel, MetaAccessor, MethodModel, ParameterModel, PropertyModel, Setter,
};
pub use meta::MetaProperties;

use crate::error::ValueError;
use crate::providable::ProviderBinding;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One externally sourced item: an ordered mapping of keys to values
pub type Record = Map<String, Value>;

/// A statically declared, hydratable entity type
pub trait Entity: Sized + Send + 'static {
    /// Describe the type's hydratable surface
    ///
    /// Called at most once per type by each hydrator.
    fn describe() -> EntityModel<Self>;

    fn binding(&self) -> &ProviderBinding;

    fn binding_mut(&mut self) -> &mut ProviderBinding;
}

/// Decode a record value into a typed field value
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ValueError> {
    serde_json::from_value(value).map_err(ValueError::from)
}
