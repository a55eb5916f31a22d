//! # Providers
//!
//! The external actor on whose behalf entities are hydrated.
//!
//! A [`Provider`] owns a [`Container`] and issues a default [`Context`]. During
//! hydration the provider's container is narrowed to the provider's own
//! concrete type, so contextual service bindings registered for that provider
//! type take effect.

pub mod container;
pub mod context;

pub use container::Container;
pub use context::Context;

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Shared provider handle; provider identity is the identity of this pointer
pub type ProviderRef = Arc<dyn Provider>;

/// Concrete type of a provider (or any other type used as a container scope)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderType {
    id: TypeId,
    name: &'static str,
}

impl ProviderType {
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

impl fmt::Debug for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProviderType({})", self.name)
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Source of entities and owner of their dependency container
pub trait Provider: Send + Sync + 'static {
    /// Human-readable provider name for diagnostics
    fn name(&self) -> &str;

    fn container(&self) -> &Container;

    /// Context used when a hydration call supplies none
    fn default_context(&self) -> Context {
        Context::new(self.container().clone())
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::of::<Self>()
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("type", &self.provider_type())
            .finish()
    }
}

/// Whether two handles refer to the same provider instance
pub fn same_provider(a: &ProviderRef, b: &ProviderRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
