//! Error types for katamari.

use std::io;

use crate::arity::Arity;

/// Boxed error carried as the cause of a failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while registering commands.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate command name: {name} (already bound to {existing})")]
    DuplicateName {
        /// The colliding name, as normalized by the registry.
        name: String,
        /// Canonical name of the command that already owns it.
        existing: String,
    },

    #[error("invalid command name: {0:?}")]
    InvalidName(String),

    #[error("{command}: argument range {arity:?} accepts no argument count")]
    InvalidArity { command: String, arity: Arity },
}

/// A command name that no registered command answers to.
///
/// Carries the token exactly as the caller supplied it.
#[derive(Debug, thiserror::Error)]
#[error("command not found: {name}")]
pub struct CommandNotFound {
    name: String,
    #[source]
    cause: Option<BoxError>,
}

impl CommandNotFound {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cause: None,
        }
    }

    pub fn with_cause(name: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            name: name.into(),
            cause: Some(cause.into()),
        }
    }

    /// The unresolved token, unmodified.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

/// Which kind of failure a dispatch produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArguments,
    Handler,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArguments => "invalid_arguments",
            Self::Handler => "handler_error",
        }
    }
}

/// Failure outcome of a single dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    NotFound(#[from] CommandNotFound),

    #[error("{command}: expected {expected}, got {given}")]
    InvalidArguments {
        command: String,
        expected: Arity,
        given: usize,
    },

    #[error("{command}: {cause}")]
    Handler {
        command: String,
        #[source]
        cause: BoxError,
    },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::Handler { .. } => ErrorKind::Handler,
        }
    }

    /// Conventional shell exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NotFound => 127,
            ErrorKind::InvalidArguments => 2,
            ErrorKind::Handler => 1,
        }
    }

    /// The name the failure refers to: the raw token for not-found, the
    /// canonical name otherwise.
    pub fn command(&self) -> &str {
        match self {
            Self::NotFound(e) => e.name(),
            Self::InvalidArguments { command, .. } | Self::Handler { command, .. } => command,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config error: {0}")]
    Invalid(String),
}
