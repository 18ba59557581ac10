//! Line and script execution on top of a [`Dispatcher`].

use std::collections::BTreeMap;

use katamari_dispatch::{
    Arity, CommandOutput, Context, DispatchError, DispatchOutcome, Dispatcher, NameMatch,
};

use crate::error::ShellError;
use crate::lex::split_line;

/// Commands the shell answers itself because they need the registry.
///
/// These names are reserved: a registry binding any of them is refused by
/// [`Shell::new`].
pub const SHELL_BUILTINS: &[(&str, &str)] = &[
    ("help", "List commands or describe one"),
    ("which", "Show what a name resolves to"),
];

/// Executes command lines through a dispatcher.
#[derive(Debug, Clone)]
pub struct Shell {
    dispatcher: Dispatcher,
}

impl Shell {
    /// Fails with `ReservedName` when the registry binds a shell built-in
    /// name, which the shell would otherwise shadow.
    pub fn new(dispatcher: Dispatcher) -> Result<Self, ShellError> {
        let registry = dispatcher.registry();
        if let Some(&(name, _)) = SHELL_BUILTINS
            .iter()
            .find(|(name, _)| registry.contains(name))
        {
            return Err(ShellError::ReservedName(name.to_string()));
        }
        Ok(Self { dispatcher })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Parse and execute one command line.
    ///
    /// Blank lines and `#` comments produce no output. The exit status of the
    /// command is stored in the `?` variable of `ctx`.
    pub fn execute(&self, line: &str, ctx: &mut Context) -> Result<CommandOutput, ShellError> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(CommandOutput::None);
        }

        match split_line(trimmed, ctx) {
            Ok(tokens) => match tokens.split_first() {
                Some((name, args)) => self.execute_argv(name, args, ctx),
                None => Ok(CommandOutput::None),
            },
            Err(e) => {
                ctx.set_var("?", &e.exit_code().to_string());
                Err(e)
            },
        }
    }

    /// Execute an already-split command, e.g. from process arguments.
    ///
    /// Sets the `?` variable like [`execute`](Self::execute).
    pub fn execute_argv<S: AsRef<str>>(
        &self,
        name: &str,
        args: &[S],
        ctx: &mut Context,
    ) -> Result<CommandOutput, ShellError> {
        let result = self.dispatch(name, args, ctx).map_err(ShellError::from);
        let status = match &result {
            Ok(_) => 0,
            Err(e) => e.exit_code(),
        };
        ctx.set_var("?", &status.to_string());
        result
    }

    /// Execute a script one line at a time, stopping at the first failure.
    ///
    /// Returns the visible output of every line that produced some.
    pub fn run_script(
        &self,
        source: &str,
        ctx: &mut Context,
    ) -> Result<Vec<CommandOutput>, ShellError> {
        let mut outputs = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            match self.execute(line, ctx) {
                Ok(CommandOutput::None) => {},
                Ok(output) => outputs.push(output),
                Err(e) => {
                    return Err(ShellError::Script {
                        line: idx + 1,
                        source: Box::new(e),
                    });
                },
            }
        }
        Ok(outputs)
    }

    fn dispatch<S: AsRef<str>>(
        &self,
        name: &str,
        args: &[S],
        ctx: &mut Context,
    ) -> DispatchOutcome {
        let policy = self.dispatcher.registry().policy();
        match policy.normalize(name).as_str() {
            "help" => self.help(args),
            "which" => self.which(args),
            _ => self.dispatcher.run(name, args, ctx),
        }
    }

    fn help<S: AsRef<str>>(&self, args: &[S]) -> DispatchOutcome {
        check_arity("help", Arity::AtMost(1), args)?;
        if let Some(name) = args.first().map(AsRef::as_ref) {
            let policy = self.dispatcher.registry().policy();
            if let Some((builtin, desc)) = shell_builtin(policy, name) {
                return Ok(CommandOutput::Text(format!(
                    "{builtin} (shell)\n  {desc}\n  Usage: {builtin} [command]"
                )));
            }
            let cmd = self.dispatcher.resolver().resolve(name)?;
            let mut out = format!("{} ({})\n", cmd.name(), cmd.category());
            if !cmd.description().is_empty() {
                out.push_str(&format!("  {}\n", cmd.description()));
            }
            let aliases: Vec<&str> = cmd.aliases().collect();
            if !aliases.is_empty() {
                out.push_str(&format!("  Aliases: {}\n", aliases.join(", ")));
            }
            out.push_str(&format!("  Usage: {}", cmd.usage()));
            return Ok(CommandOutput::Text(out));
        }

        // Group by category; commands keep registration order within a group.
        let mut categories: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for &(name, desc) in SHELL_BUILTINS {
            categories.entry("shell").or_default().push((name, desc));
        }
        for cmd in self.dispatcher.registry().descriptors() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let total: usize = categories.values().map(Vec::len).sum();
        let mut out = format!("Commands ({total}):\n");
        for (category, cmds) in &categories {
            out.push_str(&format!("\n  [{category}]\n"));
            for (name, desc) in cmds {
                if desc.is_empty() {
                    out.push_str(&format!("    {name}\n"));
                } else {
                    out.push_str(&format!("    {name:12} {desc}\n"));
                }
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        Ok(CommandOutput::Text(out))
    }

    fn which<S: AsRef<str>>(&self, args: &[S]) -> DispatchOutcome {
        check_arity("which", Arity::Exactly(1), args)?;
        let name = args[0].as_ref();
        let policy = self.dispatcher.registry().policy();
        if let Some((builtin, _)) = shell_builtin(policy, name) {
            return Ok(CommandOutput::Text(format!("{builtin}: shell built-in")));
        }
        let cmd = self.dispatcher.resolver().resolve(name)?;
        if policy.normalize(cmd.name()) == policy.normalize(name) {
            Ok(CommandOutput::Text(format!(
                "{}: {} ({})",
                cmd.name(),
                cmd.description(),
                cmd.category()
            )))
        } else {
            Ok(CommandOutput::Text(format!(
                "{}: alias for {}",
                name.trim(),
                cmd.name()
            )))
        }
    }
}

fn shell_builtin(policy: NameMatch, name: &str) -> Option<(&'static str, &'static str)> {
    let name = policy.normalize(name);
    SHELL_BUILTINS
        .iter()
        .copied()
        .find(|(builtin, _)| *builtin == name)
}

fn check_arity<S>(command: &str, expected: Arity, args: &[S]) -> Result<(), DispatchError> {
    if expected.accepts(args.len()) {
        Ok(())
    } else {
        Err(DispatchError::InvalidArguments {
            command: command.to_string(),
            expected,
            given: args.len(),
        })
    }
}
