//! # Providable Contract
//!
//! Write-once association between an entity and the provider it was hydrated
//! for, plus the per-entity-type hydration entry points.
//!
//! ## Binding Lifecycle
//!
//! ```text
//! Unbound ──bind(provider, context)──→ Bound(provider, context)
//!                                        │
//!                                        ├─ bind(same provider) → Ok, context replaced
//!                                        └─ bind(other provider) → Rebinding error
//! ```

use crate::constants::Conformity;
use crate::error::{HydrationError, Result};
use crate::hydration::{HydrateMany, Hydrator};
use crate::model::{Entity, Record};
use crate::provider::{same_provider, Context, ProviderRef};
use std::any::TypeId;
use std::fmt;

/// Type an entity is registered as when resolved through a container
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceType({})", self.name)
    }
}

#[derive(Clone, Default)]
enum BindingState {
    #[default]
    Unbound,
    Bound {
        provider: ProviderRef,
        context: Context,
    },
}

/// Provider binding state carried by every entity
#[derive(Clone, Default)]
pub struct ProviderBinding {
    state: BindingState,
    service: Option<ServiceType>,
}

impl ProviderBinding {
    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound { .. })
    }

    pub fn provider(&self) -> Option<&ProviderRef> {
        match &self.state {
            BindingState::Bound { provider, .. } => Some(provider),
            BindingState::Unbound => None,
        }
    }

    pub fn context(&self) -> Option<&Context> {
        match &self.state {
            BindingState::Bound { context, .. } => Some(context),
            BindingState::Unbound => None,
        }
    }

    pub fn service(&self) -> Option<ServiceType> {
        self.service
    }

    /// Bind a provider and context
    ///
    /// Binding the provider already bound replaces the context; binding any
    /// other provider fails and leaves the state unchanged.
    pub fn bind(&mut self, entity: &str, provider: ProviderRef, context: Context) -> Result<()> {
        if let BindingState::Bound { provider: existing, .. } = &self.state {
            if !same_provider(existing, &provider) {
                return Err(HydrationError::Rebinding {
                    entity: entity.to_string(),
                    existing: existing.name().to_string(),
                    requested: provider.name().to_string(),
                });
            }
        }

        self.state = BindingState::Bound { provider, context };
        Ok(())
    }

    /// Record the service type, once
    pub fn set_service(&mut self, entity: &str, service: ServiceType) -> Result<()> {
        match self.service {
            Some(existing) if existing != service => Err(HydrationError::ServiceRebinding {
                entity: entity.to_string(),
                existing: existing.name().to_string(),
                requested: service.name().to_string(),
            }),
            _ => {
                self.service = Some(service);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ProviderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBinding")
            .field("provider", &self.provider().map(|p| p.name().to_string()))
            .field("service", &self.service)
            .finish()
    }
}

/// Provider-aware operations available on every [`Entity`]
pub trait Providable: Entity {
    /// Provider the entity was hydrated for
    fn provider(&self) -> Option<&ProviderRef> {
        self.binding().provider()
    }

    /// Context the entity was hydrated in
    fn context(&self) -> Option<&Context> {
        self.binding().context()
    }

    /// Service type, defaulting to the entity's own type
    fn service_type(&self) -> ServiceType {
        self.binding()
            .service()
            .unwrap_or_else(ServiceType::of::<Self>)
    }

    fn set_provider(&mut self, provider: ProviderRef, context: Context) -> Result<()> {
        self.binding_mut()
            .bind(std::any::type_name::<Self>(), provider, context)
    }

    fn set_service(&mut self, service: ServiceType) -> Result<()> {
        self.binding_mut()
            .set_service(std::any::type_name::<Self>(), service)
    }

    /// Hydrate one entity with the process-wide hydrator
    fn hydrate_one(record: Record, provider: &ProviderRef, context: Option<&Context>) -> Result<Self> {
        Hydrator::global().hydrate_one(record, provider, context)
    }

    /// Lazily hydrate a batch of entities with the process-wide hydrator
    fn hydrate_many<I>(
        records: I,
        provider: &ProviderRef,
        conformity: Conformity,
        context: Option<&Context>,
    ) -> HydrateMany<'static, Self, I::IntoIter>
    where
        I: IntoIterator<Item = Record>,
    {
        Hydrator::global().hydrate_many(records, provider, conformity, context)
    }
}

impl<E: Entity> Providable for E {}
