//! Dispatch: resolve, validate, invoke.

use std::sync::Arc;

use katamari_types::DispatchError;

use crate::context::{CommandOutput, Context};
use crate::registry::CommandRegistry;
use crate::resolver::Resolver;
use crate::shared::SharedRegistry;

/// Result of one [`Dispatcher::run`] call.
pub type DispatchOutcome = Result<CommandOutput, DispatchError>;

/// Resolves a command name, checks its arguments, and invokes its handler.
///
/// Every call reports exactly one outcome. Nothing is retried: not-found and
/// invalid-argument failures are final, and handler failures are handed back
/// to the caller with their cause intact.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    resolver: Resolver,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            resolver: Resolver::new(registry),
        }
    }

    /// Dispatch against the current state of a shared registry.
    pub fn from_shared(shared: &SharedRegistry) -> Self {
        Self::new(shared.snapshot())
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.resolver.registry()
    }

    /// Run the command named `name` with `args`.
    pub fn run<S: AsRef<str>>(
        &self,
        name: &str,
        args: &[S],
        ctx: &mut Context,
    ) -> DispatchOutcome {
        log::debug!("Dispatching {name:?} with {} argument(s)", args.len());

        let descriptor = match self.resolver.resolve(name) {
            Ok(d) => d,
            Err(not_found) => {
                log::debug!("{not_found}");
                return Err(DispatchError::NotFound(not_found));
            },
        };

        let arity = descriptor.arity();
        if !arity.accepts(args.len()) {
            let err = DispatchError::InvalidArguments {
                command: descriptor.name().to_string(),
                expected: arity,
                given: args.len(),
            };
            log::debug!("{err}");
            return Err(err);
        }

        let argv: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        match descriptor.handler().call(&argv, ctx) {
            Ok(output) => {
                log::debug!("Command {} succeeded", descriptor.name());
                Ok(output)
            },
            Err(cause) => {
                let err = DispatchError::Handler {
                    command: descriptor.name().to_string(),
                    cause,
                };
                log::debug!("{err}");
                Err(err)
            },
        }
    }
}
