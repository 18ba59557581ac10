//! Built-in commands.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use katamari_dispatch::{
    Arity, BoxError, Command, CommandOutput, CommandRegistry, Context, RegistryError,
};

/// Register the built-in commands into a registry.
///
/// `help` and `which` need the registry itself and are handled by
/// [`Shell`](crate::Shell) instead.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<(), RegistryError> {
    reg.register_command(EchoCmd)?;
    reg.register_command(PwdCmd)?;
    reg.register_command(CdCmd)?;
    reg.register_command(EnvCmd)?;
    reg.register_command(SetCmd)?;
    reg.register_command(UnsetCmd)?;
    reg.register_command(SleepCmd)?;
    reg.register_command(VersionCmd)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print arguments"
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        if args.is_empty()
            && let Some(stdin) = ctx.stdin.take()
        {
            return Ok(CommandOutput::Text(stdin));
        }
        Ok(CommandOutput::Text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "fs"
    }
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        Ok(CommandOutput::Text(ctx.cwd.display().to_string()))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn aliases(&self) -> &[&str] {
        &["chdir"]
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> &str {
        "fs"
    }
    fn arity(&self) -> Arity {
        Arity::AtMost(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        let target = match args.first() {
            Some(path) => ctx.cwd.join(path),
            None => match ctx.var("HOME") {
                Some(home) => PathBuf::from(home),
                None => return Ok(CommandOutput::None),
            },
        };
        let meta = fs::metadata(&target).map_err(|e| format!("{}: {e}", target.display()))?;
        if !meta.is_dir() {
            return Err(format!("not a directory: {}", target.display()).into());
        }
        ctx.cwd = fs::canonicalize(&target)?;
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// env
// ---------------------------------------------------------------------------

struct EnvCmd;
impl Command for EnvCmd {
    fn name(&self) -> &str {
        "env"
    }
    fn description(&self) -> &str {
        "List shell variables"
    }
    fn usage(&self) -> &str {
        "env"
    }
    fn category(&self) -> &str {
        "config"
    }
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }
    fn execute(&self, _args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        Ok(list_variables(ctx))
    }
}

fn list_variables(ctx: &Context) -> CommandOutput {
    let mut entries: Vec<(&str, &str)> = ctx
        .vars
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    entries.sort_by_key(|(k, _)| *k);
    let lines: Vec<String> = entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
    CommandOutput::Text(lines.join("\n"))
}

// ---------------------------------------------------------------------------
// set / unset
// ---------------------------------------------------------------------------

struct SetCmd;
impl Command for SetCmd {
    fn name(&self) -> &str {
        "set"
    }
    fn description(&self) -> &str {
        "Set or show a shell variable"
    }
    fn usage(&self) -> &str {
        "set [VAR[=value]]"
    }
    fn category(&self) -> &str {
        "config"
    }
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        if args.is_empty() {
            return Ok(list_variables(ctx));
        }
        let assignment = args.join(" ");
        match assignment.split_once('=') {
            Some((name, value)) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err("usage: set VAR=value".into());
                }
                ctx.set_var(name, value.trim());
                Ok(CommandOutput::None)
            },
            None => match ctx.var(args[0]) {
                Some(value) => Ok(CommandOutput::Text(format!("{}={value}", args[0]))),
                None => Ok(CommandOutput::Text(format!("{}: not set", args[0]))),
            },
        }
    }
}

struct UnsetCmd;
impl Command for UnsetCmd {
    fn name(&self) -> &str {
        "unset"
    }
    fn description(&self) -> &str {
        "Remove shell variables"
    }
    fn usage(&self) -> &str {
        "unset <VAR>..."
    }
    fn category(&self) -> &str {
        "config"
    }
    fn arity(&self) -> Arity {
        Arity::AtLeast(1)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        for name in args {
            ctx.vars.remove(*name);
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// sleep
// ---------------------------------------------------------------------------

/// Upper bound so a typo cannot hang a script.
const MAX_SLEEP_SECS: f64 = 3600.0;

struct SleepCmd;
impl Command for SleepCmd {
    fn name(&self) -> &str {
        "sleep"
    }
    fn description(&self) -> &str {
        "Pause for a number of seconds"
    }
    fn usage(&self) -> &str {
        "sleep <seconds>"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn arity(&self) -> Arity {
        Arity::Exactly(1)
    }
    fn execute(&self, args: &[&str], _ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        let secs: f64 = args[0]
            .parse()
            .map_err(|e| format!("invalid duration {:?}: {e}", args[0]))?;
        if !(0.0..=MAX_SLEEP_SECS).contains(&secs) {
            return Err(format!("duration out of range: {secs}").into());
        }
        std::thread::sleep(Duration::from_secs_f64(secs));
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

struct VersionCmd;
impl Command for VersionCmd {
    fn name(&self) -> &str {
        "version"
    }
    fn aliases(&self) -> &[&str] {
        &["--version"]
    }
    fn description(&self) -> &str {
        "Print the katamari version"
    }
    fn usage(&self) -> &str {
        "version"
    }
    fn category(&self) -> &str {
        "system"
    }
    fn arity(&self) -> Arity {
        Arity::Exactly(0)
    }
    fn execute(&self, _args: &[&str], _ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        Ok(CommandOutput::Text(format!(
            "katamari {}",
            env!("CARGO_PKG_VERSION")
        )))
    }
}
