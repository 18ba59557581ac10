//! Line front end for katamari.
//!
//! Turns raw command lines into dispatcher calls: quote-aware lexing with
//! variable expansion, and the registry-aware `help` and `which` built-ins.
//! The dispatch core itself never parses text.

mod builtins;
mod error;
mod lex;
mod shell;

/// Register the built-in commands (echo, pwd, cd, env, set, unset, sleep, version).
pub use builtins::register_builtins;
/// Errors produced while executing a line or script.
pub use error::ShellError;
/// Split a line into words, expanding `$VAR` / `${VAR}` against a context.
pub use lex::split_line;
/// Executes command lines and scripts through a dispatcher.
pub use shell::{SHELL_BUILTINS, Shell};
