//! Front-end errors.

use katamari_types::DispatchError;

/// Errors produced while executing a line or script.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("parse error: {0}")]
    Tokenize(String),

    #[error("{0}: name is reserved for a shell built-in")]
    ReservedName(String),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("line {line}: {source}")]
    Script {
        /// 1-based line number in the script.
        line: usize,
        source: Box<ShellError>,
    },
}

impl ShellError {
    /// Exit status a front end should report for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Tokenize(_) | Self::ReservedName(_) => 2,
            Self::Dispatch(e) => e.exit_code(),
            Self::Script { source, .. } => source.exit_code(),
        }
    }

    /// The underlying dispatch failure, if any.
    pub fn dispatch_error(&self) -> Option<&DispatchError> {
        match self {
            Self::Tokenize(_) | Self::ReservedName(_) => None,
            Self::Dispatch(e) => Some(e),
            Self::Script { source, .. } => source.dispatch_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use katamari_types::CommandNotFound;

    use super::*;

    #[test]
    fn tokenize_display_and_code() {
        let e = ShellError::Tokenize("unterminated single quote".into());
        assert_eq!(format!("{e}"), "parse error: unterminated single quote");
        assert_eq!(e.exit_code(), 2);
        assert!(e.dispatch_error().is_none());
    }

    #[test]
    fn reserved_name_display() {
        let e = ShellError::ReservedName("help".into());
        assert_eq!(format!("{e}"), "help: name is reserved for a shell built-in");
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn dispatch_is_transparent() {
        let e = ShellError::from(DispatchError::from(CommandNotFound::new("zap")));
        assert_eq!(format!("{e}"), "command not found: zap");
        assert_eq!(e.exit_code(), 127);
    }

    #[test]
    fn script_wraps_line_number() {
        let inner = ShellError::from(DispatchError::from(CommandNotFound::new("zap")));
        let e = ShellError::Script {
            line: 3,
            source: Box::new(inner),
        };
        assert_eq!(format!("{e}"), "line 3: command not found: zap");
        assert_eq!(e.exit_code(), 127);
        assert_eq!(e.dispatch_error().map(DispatchError::command), Some("zap"));
    }
}
