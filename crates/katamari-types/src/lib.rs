//! Foundation types for katamari.
//!
//! This crate contains the types shared by every katamari crate: validated
//! command names and the matching policy, argument arity, the error
//! taxonomy, and configuration loading.

pub mod arity;
pub mod config;
pub mod error;
pub mod name;

pub use arity::Arity;
pub use config::{KatamariConfig, OutputFormat};
pub use error::{
    BoxError, CommandNotFound, ConfigError, DispatchError, ErrorKind, RegistryError,
};
pub use name::{CommandName, NameMatch};
