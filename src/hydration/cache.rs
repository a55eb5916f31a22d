//! # Binder Cache
//!
//! Process-lifetime cache of entity models and compiled binders.
//!
//! Entries are type-erased so one map serves every entity type. Population
//! happens outside the map lock: two threads missing on the same key may both
//! compile a binder, and the first one inserted is the one retained. Either is
//! valid since binders are pure functions of their metadata.

use crate::config::CacheConfig;
use crate::hydration::binder::{Binder, Lookup};
use crate::model::{Entity, EntityModel};
use crate::provider::ProviderType;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

type Erased = Arc<dyn Any + Send + Sync>;

/// Cache key for one compiled binder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinderKey {
    entity: TypeId,
    provider: TypeId,
    lookup: Lookup,
    signature: Vec<String>,
}

impl BinderKey {
    /// Named signatures ignore key order; positional ones keep it
    pub fn new<E: Entity>(provider: ProviderType, lookup: Lookup, keys: &[String]) -> Self {
        let mut signature = keys.to_vec();
        if lookup == Lookup::Named {
            signature.sort_unstable();
        }
        Self {
            entity: TypeId::of::<E>(),
            provider: provider.id(),
            lookup,
            signature,
        }
    }
}

/// Statistics about the binder cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinderCacheStats {
    pub cached_models: usize,
    pub cached_binders: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Shared model and binder cache
pub struct BinderCache {
    config: CacheConfig,
    models: DashMap<TypeId, Erased>,
    binders: DashMap<BinderKey, Erased>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BinderCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            models: DashMap::new(),
            binders: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The entity model for `E`, describing the type on first use
    pub fn model<E: Entity>(&self) -> Arc<EntityModel<E>> {
        let id = TypeId::of::<E>();
        let cached = self.models.get(&id).map(|entry| Arc::clone(entry.value()));
        if let Some(model) = cached.and_then(|model| model.downcast::<EntityModel<E>>().ok()) {
            return model;
        }

        let model = Arc::new(E::describe());
        debug!(entity = model.name, "Described entity type");

        let retained = Arc::clone(
            self.models
                .entry(id)
                .or_insert_with(|| Arc::clone(&model) as Erased)
                .value(),
        );
        retained.downcast::<EntityModel<E>>().unwrap_or(model)
    }

    /// A previously compiled binder, if any
    pub fn binder<E: Entity>(&self, key: &BinderKey) -> Option<Arc<Binder<E>>> {
        if !self.config.enabled {
            return None;
        }

        let cached = self.binders.get(key).map(|entry| Arc::clone(entry.value()));
        match cached.and_then(|binder| binder.downcast::<Binder<E>>().ok()) {
            Some(binder) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(binder)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Retain `binder` unless another was inserted first; returns the retained one
    pub fn insert<E: Entity>(&self, key: BinderKey, binder: Arc<Binder<E>>) -> Arc<Binder<E>> {
        if !self.config.enabled {
            return binder;
        }

        if self.binders.len() >= self.config.max_binders && !self.binders.contains_key(&key) {
            debug!(
                entity = binder.metadata().entity(),
                max_binders = self.config.max_binders,
                "Binder cache full, not retaining binder"
            );
            return binder;
        }

        let retained = Arc::clone(
            self.binders
                .entry(key)
                .or_insert_with(|| Arc::clone(&binder) as Erased)
                .value(),
        );
        retained.downcast::<Binder<E>>().unwrap_or(binder)
    }

    pub fn clear(&self) {
        self.models.clear();
        self.binders.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        info!("Binder cache cleared");
    }

    pub fn stats(&self) -> BinderCacheStats {
        BinderCacheStats {
            cached_models: self.models.len(),
            cached_binders: self.binders.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for BinderCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
