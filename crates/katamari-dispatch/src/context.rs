//! Handler context and command output.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Tabular data (header row + data rows).
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Command produced no visible output.
    None,
}

impl CommandOutput {
    /// Render as plain text. Tables are joined with ` | `.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Table { headers, rows } => {
                let mut out = headers.join(" | ");
                for row in rows {
                    out.push('\n');
                    out.push_str(&row.join(" | "));
                }
                out
            },
            Self::None => String::new(),
        }
    }
}

/// Shared mutable state passed to every handler.
///
/// Produced by the front end that parsed the command line; the dispatcher
/// only forwards it.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Shell variables.
    pub vars: HashMap<String, String>,
    /// Piped input from a previous command.
    pub stdin: Option<String>,
}

impl Context {
    /// Create a context rooted at `cwd` with the default variables.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        let mut vars = HashMap::new();
        vars.insert("SHELL".to_string(), "katamari".to_string());
        vars.insert("?".to_string(), "0".to_string());
        Self {
            cwd: cwd.into(),
            vars,
            stdin: None,
        }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_text() {
        assert_eq!(CommandOutput::Text("hi".into()).render(), "hi");
    }

    #[test]
    fn render_table() {
        let out = CommandOutput::Table {
            headers: vec!["name".into(), "kind".into()],
            rows: vec![
                vec!["build".into(), "task".into()],
                vec!["run".into(), "task".into()],
            ],
        };
        assert_eq!(out.render(), "name | kind\nbuild | task\nrun | task");
    }

    #[test]
    fn render_none_is_empty() {
        assert_eq!(CommandOutput::None.render(), "");
    }

    #[test]
    fn new_context_has_default_vars() {
        let ctx = Context::new("/work");
        assert_eq!(ctx.cwd, PathBuf::from("/work"));
        assert_eq!(ctx.var("SHELL"), Some("katamari"));
        assert_eq!(ctx.var("?"), Some("0"));
        assert!(ctx.stdin.is_none());
    }

    #[test]
    fn set_and_get_var() {
        let mut ctx = Context::default();
        ctx.set_var("TARGET", "release");
        assert_eq!(ctx.var("TARGET"), Some("release"));
        assert_eq!(ctx.var("MISSING"), None);
    }
}
