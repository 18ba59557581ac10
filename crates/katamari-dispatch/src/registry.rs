//! Command registry: name and alias bindings with registration-order listing.

use std::fmt;
use std::sync::Arc;

use katamari_types::{CommandNotFound, NameMatch, RegistryError};

use crate::descriptor::{Command, CommandDescriptor};
use crate::table::NameTable;

/// Registry of available commands.
///
/// Every canonical name and alias maps to one shared descriptor instance.
/// Built during startup and treated as read-only while dispatching; share it
/// across threads behind an `Arc`.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    table: NameTable<CommandDescriptor>,
}

impl CommandRegistry {
    /// Create an empty registry with exact name matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with the given name-matching policy.
    pub fn with_policy(policy: NameMatch) -> Self {
        Self {
            table: NameTable::with_policy(policy),
        }
    }

    pub fn policy(&self) -> NameMatch {
        self.table.policy()
    }

    /// Register a descriptor under its canonical name and every alias.
    ///
    /// All bindings are inserted or none are: on `DuplicateName` the registry
    /// is left unchanged.
    pub fn register(
        &mut self,
        descriptor: CommandDescriptor,
    ) -> Result<Arc<CommandDescriptor>, RegistryError> {
        let names: Vec<String> = descriptor.names().map(str::to_string).collect();
        let descriptor = self.table.insert(names, Arc::new(descriptor))?;
        log::debug!(
            "Registered command {} ({} alias(es))",
            descriptor.name(),
            descriptor.aliases().count()
        );
        Ok(descriptor)
    }

    /// Register a [`Command`] implementation.
    pub fn register_command<C: Command + 'static>(
        &mut self,
        cmd: C,
    ) -> Result<Arc<CommandDescriptor>, RegistryError> {
        self.register(CommandDescriptor::from_command(cmd)?)
    }

    /// Look up the descriptor bound to `name` (canonical or alias).
    ///
    /// The not-found failure carries `name` exactly as given.
    pub fn lookup(&self, name: &str) -> Result<Arc<CommandDescriptor>, CommandNotFound> {
        self.get(name)
            .map(Arc::clone)
            .ok_or_else(|| CommandNotFound::new(name))
    }

    /// Borrowing lookup; `None` when unbound.
    pub fn get(&self, name: &str) -> Option<&Arc<CommandDescriptor>> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    /// Canonical names in registration order.
    ///
    /// The iterator is cheap to clone; call again to restart.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &str> + Clone + '_ {
        self.table.names()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl ExactSizeIterator<Item = &Arc<CommandDescriptor>> + '_ {
        self.table.values()
    }

    /// Number of registered commands (aliases not counted).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Sorted names and aliases starting with `partial`.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        self.table.completions(partial)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("policy", &self.policy())
            .field("commands", &self.list().collect::<Vec<_>>())
            .finish()
    }
}
