//! # Hydration Engine
//!
//! Turns loosely keyed records into entity instances on behalf of a provider.
//!
//! ## Architecture
//!
//! ```text
//! Record ──→ Hydrator ──→ BinderCache ──hit──→ Binder ──→ Entity
//!               │              │                  ↑
//!               │              └──miss──→ TargetMetadata::build
//!               │
//!               └─→ provider container narrowed to the provider type
//!                   └─→ Context (supplied or provider default)
//! ```
//!
//! ## Conformity
//!
//! [`Hydrator::hydrate_many`] compiles one binder from the first record and
//! reuses it for the whole batch under [`Conformity::Partial`] (named lookup)
//! and [`Conformity::Complete`] (positional lookup). Under
//! [`Conformity::None`] a binder is resolved per record from that record's own
//! keys, which is a cache hit whenever the key set has been seen before.
//!
//! Records that break a declared conformity guarantee are not detected and may
//! be bound incorrectly.

pub mod binder;
pub mod cache;
pub mod coerce;
pub mod metadata;

pub use binder::{Binder, Lookup};
pub use cache::{BinderCache, BinderCacheStats, BinderKey};
pub use coerce::DateCoercer;
pub use metadata::{KeyTarget, TargetMetadata};

use crate::config::HydrationConfig;
use crate::constants::Conformity;
use crate::error::Result;
use crate::logging::{init_structured_logging, log_error, log_hydration_operation};
use crate::model::{Entity, Record};
use crate::provider::{Context, ProviderRef, ProviderType};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL_HYDRATOR: OnceLock<Hydrator> = OnceLock::new();

/// Hydration façade owning the binder cache and coercion settings
pub struct Hydrator {
    config: HydrationConfig,
    cache: BinderCache,
    dates: Arc<DateCoercer>,
}

impl Hydrator {
    pub fn new(config: HydrationConfig) -> Self {
        Self {
            cache: BinderCache::new(config.cache.clone()),
            dates: Arc::new(DateCoercer::new(&config.dates)),
            config,
        }
    }

    /// Process-wide hydrator configured from the environment
    ///
    /// First use also installs structured logging from the `logging` section.
    pub fn global() -> &'static Self {
        GLOBAL_HYDRATOR.get_or_init(|| {
            let config = HydrationConfig::from_environment();
            init_structured_logging(&config.logging);
            Self::new(config)
        })
    }

    pub fn config(&self) -> &HydrationConfig {
        &self.config
    }

    /// Effective context for one operation
    ///
    /// The supplied context (or the provider's default) is rebound to the
    /// provider's container narrowed to the provider's own type.
    pub fn resolve_context(&self, provider: &ProviderRef, context: Option<&Context>) -> Context {
        let container = provider.container().in_context_of(provider.provider_type());
        match context {
            Some(context) => context.with_container(container),
            None => provider.default_context().with_container(container),
        }
    }

    /// Binder for `record`'s key signature, compiled on a cache miss
    pub fn binder<E: Entity>(
        &self,
        record: &Record,
        provider: ProviderType,
        lookup: Lookup,
    ) -> Result<Arc<Binder<E>>> {
        let keys: Vec<String> = record.keys().cloned().collect();
        let key = BinderKey::new::<E>(provider, lookup, &keys);
        if let Some(binder) = self.cache.binder::<E>(&key) {
            return Ok(binder);
        }

        let model = self.cache.model::<E>();
        let metadata = TargetMetadata::build(&model, keys, provider)?;
        debug!(
            entity = model.name,
            provider = %provider,
            lookup = ?lookup,
            keys = metadata.keys().len(),
            parameters = metadata.parameter_count(),
            "Compiled binder"
        );

        let binder = Arc::new(Binder::compile(
            model,
            Arc::new(metadata),
            lookup,
            Arc::clone(&self.dates),
        ));
        Ok(self.cache.insert(key, binder))
    }

    /// Hydrate one entity
    pub fn hydrate_one<E: Entity>(
        &self,
        mut record: Record,
        provider: &ProviderRef,
        context: Option<&Context>,
    ) -> Result<E> {
        self.bind_record(&mut record, provider, context)
    }

    /// Hydrate one entity, leaving constructor write-backs in `record`
    ///
    /// `record` is only updated when hydration succeeds; on error it is left
    /// exactly as supplied.
    pub fn hydrate_one_mut<E: Entity>(
        &self,
        record: &mut Record,
        provider: &ProviderRef,
        context: Option<&Context>,
    ) -> Result<E> {
        let mut working = record.clone();
        let entity = self.bind_record(&mut working, provider, context)?;
        *record = working;
        Ok(entity)
    }

    fn bind_record<E: Entity>(
        &self,
        record: &mut Record,
        provider: &ProviderRef,
        context: Option<&Context>,
    ) -> Result<E> {
        let context = self.resolve_context(provider, context);
        let binder = self.binder::<E>(record, provider.provider_type(), Lookup::Named)?;
        binder.bind(record, provider, &context)
    }

    /// Lazily hydrate a batch of records
    ///
    /// The effective conformity is the stricter of `conformity` and the
    /// context's own. No record is read until the returned iterator is
    /// advanced.
    pub fn hydrate_many<E, I>(
        &self,
        records: I,
        provider: &ProviderRef,
        conformity: Conformity,
        context: Option<&Context>,
    ) -> HydrateMany<'_, E, I::IntoIter>
    where
        E: Entity,
        I: IntoIterator<Item = Record>,
    {
        let context = self.resolve_context(provider, context);
        let conformity = conformity.stricter(context.conformity());

        HydrateMany {
            hydrator: self,
            records: records.into_iter(),
            provider: Arc::clone(provider),
            context,
            conformity,
            binder: None,
            yielded: 0,
            done: false,
            _entity: PhantomData,
        }
    }

    pub fn cache_stats(&self) -> BinderCacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl Default for Hydrator {
    fn default() -> Self {
        Self::new(HydrationConfig::default())
    }
}

/// Single-pass, lazy sequence of hydrated entities
///
/// Yields entities in input order. After the first error the sequence ends,
/// leaving the remaining input unread.
pub struct HydrateMany<'h, E, I> {
    hydrator: &'h Hydrator,
    records: I,
    provider: ProviderRef,
    context: Context,
    conformity: Conformity,
    binder: Option<Arc<Binder<E>>>,
    yielded: usize,
    done: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, I> HydrateMany<'_, E, I> {
    pub fn conformity(&self) -> Conformity {
        self.conformity
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Entities yielded so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn hydrate(&mut self, record: &mut Record) -> Result<E> {
        let binder = match &self.binder {
            Some(binder) => Arc::clone(binder),
            None => {
                let binder = self.hydrator.binder::<E>(
                    record,
                    self.provider.provider_type(),
                    Lookup::for_conformity(self.conformity),
                )?;
                if self.conformity.reuses_binder() {
                    self.binder = Some(Arc::clone(&binder));
                }
                binder
            }
        };
        binder.bind(record, &self.provider, &self.context)
    }
}

impl<E, I> Iterator for HydrateMany<'_, E, I>
where
    E: Entity,
    I: Iterator<Item = Record>,
{
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(mut record) = self.records.next() else {
            self.done = true;
            log_hydration_operation(
                "hydrate_many",
                std::any::type_name::<E>(),
                Some(self.provider.name()),
                "completed",
                Some(self.yielded),
                Some(&self.conformity.to_string()),
            );
            return None;
        };

        let result = self.hydrate(&mut record);
        match &result {
            Ok(_) => self.yielded += 1,
            Err(error) => {
                self.done = true;
                log_error(
                    "hydration",
                    "hydrate_many",
                    &error.to_string(),
                    Some(std::any::type_name::<E>()),
                );
            }
        }
        Some(result)
    }
}

impl<E, I> FusedIterator for HydrateMany<'_, E, I>
where
    E: Entity,
    I: Iterator<Item = Record>,
{
}
