//! # Service Container
//!
//! A cloneable handle over a shared service registry. Services may be bound
//! globally or contextually for one provider type; a container narrowed with
//! [`Container::in_context_of`] resolves the contextual binding first.

use crate::provider::ProviderType;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

type Service = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Registry {
    services: DashMap<TypeId, Service>,
    contextual: DashMap<(TypeId, TypeId), Service>,
}

/// Dependency container handle
#[derive(Clone, Default)]
pub struct Container {
    registry: Arc<Registry>,
    scope: Option<ProviderType>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a service for every scope
    pub fn bind<T: Any + Send + Sync>(&self, service: T) {
        self.registry
            .services
            .insert(TypeId::of::<T>(), Arc::new(service));
    }

    /// Bind a service visible only to containers narrowed to `scope`
    pub fn bind_contextual<T: Any + Send + Sync>(&self, scope: ProviderType, service: T) {
        self.registry
            .contextual
            .insert((scope.id(), TypeId::of::<T>()), Arc::new(service));
    }

    /// Resolve a service, preferring the binding for the current scope
    pub fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let service = TypeId::of::<T>();
        let contextual = self.scope.and_then(|scope| {
            self.registry
                .contextual
                .get(&(scope.id(), service))
                .map(|entry| Arc::clone(entry.value()))
        });

        contextual
            .or_else(|| {
                self.registry
                    .services
                    .get(&service)
                    .map(|entry| Arc::clone(entry.value()))
            })
            .and_then(|service| service.downcast::<T>().ok())
    }

    /// Derive a container scoped to `provider`, sharing this one's registry
    #[must_use]
    pub fn in_context_of(&self, provider: ProviderType) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            scope: Some(provider),
        }
    }

    pub fn scope(&self) -> Option<ProviderType> {
        self.scope
    }

    /// Whether both handles share one registry
    pub fn shares_registry_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("scope", &self.scope)
            .field("services", &self.registry.services.len())
            .field("contextual", &self.registry.contextual.len())
            .finish()
    }
}
