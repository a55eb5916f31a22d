#![allow(clippy::doc_markdown)] // Allow technical terms like RFC 3339 in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Entity Hydrator
//!
//! Turns loosely keyed records (string keys mapped to arbitrary values) into
//! statically declared entity instances on behalf of a provider.
//!
//! ## Overview
//!
//! An entity type describes itself once through an [`EntityModel`]: its
//! constructor parameters, settable properties, magic-method setters, and an
//! optional meta slot for unknown keys. The hydrator matches record keys
//! against that model after normalization, compiles a [`Binder`] for the
//! record's key signature, and caches it so later records with the same shape
//! skip the analysis.
//!
//! Every hydrated entity is bound to the [`Provider`] that produced it and to a
//! [`Context`] whose service container is narrowed to that provider.
//!
//! ## Key Features
//!
//! - **Key normalization**: `FirstName`, `first-name` and `first_name` all match `first_name`
//! - **Precedence**: method setter, then constructor parameter, then property, then meta
//! - **Conformity levels**: batches declared PARTIAL or COMPLETE reuse one binder
//! - **Lazy batches**: [`Hydrator::hydrate_many`] pulls one record per entity yielded
//! - **Write-once binding**: an entity cannot be moved to a different provider
//!
//! ## Module Organization
//!
//! - [`model`] - Entity registration: models, arguments, meta properties
//! - [`normalize`] - Key normalizer
//! - [`hydration`] - Target metadata, binder compiler, cache, and the hydrator façade
//! - [`provider`] - Providers, service containers, and hydration contexts
//! - [`providable`] - Provider binding lifecycle and the `Providable` contract
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use entity_hydrator::{Conformity, Providable, ProviderRef, Record};
//! # use entity_hydrator::{Arguments, Entity, EntityModel, ParameterModel, ProviderBinding};
//! # struct Person { name: String, binding: ProviderBinding }
//! # impl Entity for Person {
//! #     fn describe() -> EntityModel<Self> {
//! #         EntityModel::new("Person", |args: &mut Arguments| {
//! #             Ok(Person { name: args.value(0)?, binding: ProviderBinding::default() })
//! #         })
//! #         .parameter(ParameterModel::required("name"))
//! #     }
//! #     fn binding(&self) -> &ProviderBinding { &self.binding }
//! #     fn binding_mut(&mut self) -> &mut ProviderBinding { &mut self.binding }
//! # }
//!
//! # fn example(provider: &ProviderRef, rows: Vec<Record>) -> entity_hydrator::Result<()> {
//! for person in Person::hydrate_many(rows, provider, Conformity::Complete, None) {
//!     let person = person?;
//!     println!("{}", person.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod providable;
pub mod provider;

pub use config::{CacheConfig, ConfigManager, DateConfig, HydrationConfig, LoggingConfig};
pub use constants::{Conformity, ReservedKey};
pub use error::{HydrationError, Result, ValueError};
pub use hydration::{Binder, BinderCacheStats, HydrateMany, Hydrator, Lookup, TargetMetadata};
pub use model::{
    decode, Arguments, Entity, EntityModel, MetaProperties, ParameterModel, Record, Setter,
};
pub use normalize::normalize;
pub use providable::{Providable, ProviderBinding, ServiceType};
pub use provider::{same_provider, Container, Context, Provider, ProviderRef, ProviderType};
