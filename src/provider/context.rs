use crate::constants::Conformity;
use crate::provider::Container;

/// Per-operation hydration context
///
/// Carries the container scope and conformity level for one hydration call or
/// batch. The engine never mutates a context; derivations return new values.
#[derive(Debug, Clone, Default)]
pub struct Context {
    container: Container,
    conformity: Conformity,
}

impl Context {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            conformity: Conformity::None,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn conformity(&self) -> Conformity {
        self.conformity
    }

    /// Derive a context bound to another container
    #[must_use]
    pub fn with_container(&self, container: Container) -> Self {
        Self {
            container,
            conformity: self.conformity,
        }
    }

    #[must_use]
    pub fn with_conformity(&self, conformity: Conformity) -> Self {
        Self {
            container: self.container.clone(),
            conformity,
        }
    }
}
