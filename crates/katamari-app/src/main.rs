//! katamari command-line entry point.
//!
//! `katamari <command> [args...]` runs a single command.
//! `katamari --script <file>` runs a file, one command per line.
//! With no arguments, commands are read from standard input until EOF.

mod render;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use katamari_dispatch::{CommandOutput, CommandRegistry, Context, Dispatcher};
use katamari_nrepl::ConnectorRegistry;
use katamari_shell::{Shell, ShellError, register_builtins};
use katamari_types::config::CONFIG_ENV;
use katamari_types::{KatamariConfig, OutputFormat};

use render::{exit_status, render_error, render_output};

fn main() -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config = KatamariConfig::discover(std::env::var_os(CONFIG_ENV).map(PathBuf::from), &cwd)?;

    let default_filter = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut registry = CommandRegistry::with_policy(config.name_match());
    register_builtins(&mut registry)?;
    katamari_nrepl::register_commands(&mut registry, Arc::new(ConnectorRegistry::with_defaults()?))?;
    log::info!(
        "Starting katamari ({} commands, {:?} name matching)",
        registry.len(),
        registry.policy()
    );
    let shell = Shell::new(Dispatcher::new(Arc::new(registry)))?;

    let mut ctx = Context::new(cwd);
    for name in ["HOME", "USER"] {
        if let Ok(value) = std::env::var(name) {
            ctx.set_var(name, &value);
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let status = match args.split_first() {
        Some((flag, rest)) if flag == "--script" => {
            let path = rest.first().context("usage: katamari --script <file>")?;
            run_script(&shell, Path::new(path), &mut ctx, config.output)?
        },
        Some((name, rest)) => report(shell.execute_argv(name, rest, &mut ctx), config.output),
        None => run_stdin(&shell, &mut ctx, &config)?,
    };

    log::debug!("Exiting with status {status}");
    Ok(ExitCode::from(exit_status(status)))
}

fn run_script(
    shell: &Shell,
    path: &Path,
    ctx: &mut Context,
    format: OutputFormat,
) -> anyhow::Result<i32> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script {}", path.display()))?;
    log::info!("Running script {}", path.display());
    match shell.run_script(&source, ctx) {
        Ok(outputs) => {
            for output in &outputs {
                print_output(output, format);
            }
            Ok(0)
        },
        Err(e) => Ok(report(Err(e), format)),
    }
}

fn run_stdin(shell: &Shell, ctx: &mut Context, config: &KatamariConfig) -> anyhow::Result<i32> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();
    let mut status = 0;

    loop {
        if interactive {
            print!("{}", config.prompt);
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read standard input")?;
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        status = report(shell.execute(&line, ctx), config.output);
    }
    Ok(status)
}

/// Print an outcome and return its exit status.
fn report(result: Result<CommandOutput, ShellError>, format: OutputFormat) -> i32 {
    match result {
        Ok(output) => {
            print_output(&output, format);
            0
        },
        Err(e) => {
            let rendered = render_error(&e, format);
            match format {
                OutputFormat::Text => eprintln!("{rendered}"),
                OutputFormat::Json => println!("{rendered}"),
            }
            e.exit_code()
        },
    }
}

fn print_output(output: &CommandOutput, format: OutputFormat) {
    if let Some(text) = render_output(output, format) {
        println!("{text}");
    }
}
