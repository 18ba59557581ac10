//! Command descriptors and the handler capability.

use std::fmt;

use katamari_types::{Arity, BoxError, CommandName, RegistryError};

use crate::context::{CommandOutput, Context};

/// The executable capability bound to a command.
///
/// Any `Fn(&[&str], &mut Context) -> Result<CommandOutput, BoxError>` closure
/// that is `Send + Sync` is a handler.
pub trait Handler: Send + Sync {
    fn call(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError>;
}

impl<F> Handler for F
where
    F: Fn(&[&str], &mut Context) -> Result<CommandOutput, BoxError> + Send + Sync,
{
    fn call(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        self(args, ctx)
    }
}

/// A single executable command.
pub trait Command: Send + Sync {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Alternative names that resolve to this command.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "cd \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Accepted argument count, checked before `execute`.
    fn arity(&self) -> Arity {
        Arity::Any
    }

    /// Execute the command with the given arguments and context.
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError>;
}

struct CommandHandler<C>(C);

impl<C: Command> Handler for CommandHandler<C> {
    fn call(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        self.0.execute(args, ctx)
    }
}

/// Registered metadata and handler for one command. Immutable once built.
pub struct CommandDescriptor {
    name: CommandName,
    aliases: Vec<CommandName>,
    arity: Arity,
    description: String,
    usage: String,
    category: String,
    handler: Box<dyn Handler>,
}

impl CommandDescriptor {
    /// Start building a closure-backed descriptor named `name`.
    pub fn builder(name: &str) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.to_string(),
            aliases: Vec::new(),
            arity: Arity::Any,
            description: String::new(),
            usage: name.to_string(),
            category: "general".to_string(),
        }
    }

    /// Describe a [`Command`] implementation, taking its metadata from the trait.
    pub fn from_command<C: Command + 'static>(cmd: C) -> Result<Self, RegistryError> {
        let builder = Self::builder(cmd.name())
            .aliases(cmd.aliases().iter().copied())
            .arity(cmd.arity())
            .description(cmd.description())
            .usage(cmd.usage())
            .category(cmd.category());
        builder.build(CommandHandler(cmd))
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn canonical(&self) -> &CommandName {
        &self.name
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.aliases.iter().map(CommandName::as_str)
    }

    /// Canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.name()).chain(self.aliases())
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("arity", &self.arity)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CommandDescriptor`]. Names are validated by `build`.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    name: String,
    aliases: Vec<String>,
    arity: Arity,
    description: String,
    usage: String,
    category: String,
}

impl DescriptorBuilder {
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn aliases<'a>(mut self, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        self.aliases.extend(aliases.into_iter().map(str::to_string));
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Finish with a closure handler.
    pub fn build_fn<F>(self, f: F) -> Result<CommandDescriptor, RegistryError>
    where
        F: Fn(&[&str], &mut Context) -> Result<CommandOutput, BoxError> + Send + Sync + 'static,
    {
        self.build(f)
    }

    /// Finish with any [`Handler`].
    ///
    /// Fails with `InvalidName` for a malformed name, `DuplicateName` when
    /// an alias repeats the canonical name or another alias, and
    /// `InvalidArity` for an arity no argument count satisfies.
    pub fn build<H: Handler + 'static>(self, handler: H) -> Result<CommandDescriptor, RegistryError> {
        let name = CommandName::new(&self.name)?;
        if !self.arity.is_satisfiable() {
            return Err(RegistryError::InvalidArity {
                command: name.to_string(),
                arity: self.arity,
            });
        }
        let mut aliases: Vec<CommandName> = Vec::with_capacity(self.aliases.len());
        for raw in &self.aliases {
            let alias = CommandName::new(raw)?;
            if alias == name || aliases.contains(&alias) {
                return Err(RegistryError::DuplicateName {
                    name: alias.to_string(),
                    existing: name.to_string(),
                });
            }
            aliases.push(alias);
        }
        Ok(CommandDescriptor {
            name,
            aliases,
            arity: self.arity,
            description: self.description,
            usage: self.usage,
            category: self.category,
            handler: Box::new(handler),
        })
    }
}
