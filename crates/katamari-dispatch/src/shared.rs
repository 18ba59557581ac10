//! Registry that accepts registration after startup.

use std::sync::{Arc, PoisonError, RwLock};

use katamari_types::RegistryError;

use crate::descriptor::CommandDescriptor;
use crate::registry::CommandRegistry;

/// A [`CommandRegistry`] that can be extended while dispatches are running.
///
/// Registrations are serialized by a write lock and applied copy-on-write.
/// Readers take a [`snapshot`](Self::snapshot) and resolve against it without
/// holding any lock; a snapshot never observes a later registration.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<CommandRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(registry))),
        }
    }

    /// Register a descriptor. Atomic, like [`CommandRegistry::register`].
    pub fn register(
        &self,
        descriptor: CommandDescriptor,
    ) -> Result<Arc<CommandDescriptor>, RegistryError> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Clones the bindings only while an older snapshot is still alive.
        Arc::make_mut(&mut *current).register(descriptor)
    }

    /// The registry as of now.
    pub fn snapshot(&self) -> Arc<CommandRegistry> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }
}
