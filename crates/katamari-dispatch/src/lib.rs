//! Command registry, resolution, and dispatch.
//!
//! Commands are described by a [`CommandDescriptor`] (canonical name,
//! aliases, arity, and a [`Handler`]) and registered into a
//! [`CommandRegistry`] during startup. The [`Resolver`] turns a raw token
//! into a descriptor, and the [`Dispatcher`] resolves, validates, and
//! invokes it, reporting every failure as a typed [`DispatchError`].

mod context;
mod descriptor;
mod dispatcher;
mod registry;
mod resolver;
mod shared;
mod table;

/// Output produced by a command (text, table, nothing).
pub use context::CommandOutput;
/// Mutable state passed to every handler.
pub use context::Context;
/// A single executable command with its metadata.
pub use descriptor::Command;
/// Registered metadata and handler for one command.
pub use descriptor::CommandDescriptor;
/// Builder for closure-backed descriptors.
pub use descriptor::DescriptorBuilder;
/// The executable capability bound to a command.
pub use descriptor::Handler;
/// Resolves, validates, and invokes commands.
pub use dispatcher::{DispatchOutcome, Dispatcher};
/// Name-to-descriptor mapping with registration-order listing.
pub use registry::CommandRegistry;
/// Translates raw tokens into descriptors.
pub use resolver::Resolver;
/// Registry that accepts registration after startup.
pub use shared::SharedRegistry;
/// Names and aliases bound to shared values, under a [`NameMatch`] policy.
pub use table::NameTable;

pub use katamari_types::{
    Arity, BoxError, CommandName, CommandNotFound, DispatchError, ErrorKind, NameMatch,
    RegistryError,
};
