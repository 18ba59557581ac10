//! Outcome rendering and exit codes.

use std::error::Error;

use katamari_dispatch::CommandOutput;
use katamari_shell::ShellError;
use katamari_types::{DispatchError, OutputFormat};

/// Render a successful output. `None` when there is nothing to print.
pub fn render_output(output: &CommandOutput, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Text => match output {
            CommandOutput::None => None,
            other => Some(other.render()),
        },
        OutputFormat::Json => Some(
            serde_json::json!({
                "ok": true,
                "output": output,
            })
            .to_string(),
        ),
    }
}

/// Render a failure, including its cause chain.
pub fn render_error(err: &ShellError, format: OutputFormat) -> String {
    let causes = cause_chain(err);
    match format {
        OutputFormat::Text => {
            let mut out = format!("katamari: {err}");
            for cause in &causes {
                out.push_str(&format!("\n  caused by: {cause}"));
            }
            out
        },
        OutputFormat::Json => {
            let dispatch = err.dispatch_error();
            serde_json::json!({
                "ok": false,
                "kind": dispatch.map_or("parse_error", |e| e.kind().as_str()),
                "command": dispatch.map(|e| e.command()),
                "message": err.to_string(),
                "causes": causes,
                "exit_code": err.exit_code(),
            })
            .to_string()
        },
    }
}

/// Messages of every underlying cause not already part of `err`'s message.
fn cause_chain(err: &ShellError) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = first_unreported_cause(err);
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes
}

/// Script and handler failures print their inner error inline, so the chain
/// starts one layer further down.
fn first_unreported_cause(err: &ShellError) -> Option<&(dyn Error + 'static)> {
    match err {
        ShellError::Tokenize(_) | ShellError::ReservedName(_) => None,
        ShellError::Script { source, .. } => first_unreported_cause(source),
        ShellError::Dispatch(dispatch) => match dispatch {
            DispatchError::NotFound(not_found) => not_found
                .cause()
                .map(|cause| cause as &(dyn Error + 'static)),
            DispatchError::InvalidArguments { .. } => None,
            DispatchError::Handler { cause, .. } => cause.source(),
        },
    }
}

/// Clamp a status into the range a process can report.
pub fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use katamari_types::CommandNotFound;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("out of disk")]
    struct OutOfDisk;

    #[test]
    fn text_output() {
        let out = CommandOutput::Text("hello".into());
        assert_eq!(
            render_output(&out, OutputFormat::Text).as_deref(),
            Some("hello")
        );
        assert_eq!(render_output(&CommandOutput::None, OutputFormat::Text), None);
    }

    #[test]
    fn json_output() {
        let out = CommandOutput::Text("hello".into());
        let rendered = render_output(&out, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["output"]["kind"], "text");
        assert_eq!(value["output"]["value"], "hello");
    }

    #[test]
    fn text_not_found() {
        let err = ShellError::from(DispatchError::from(CommandNotFound::new("zap")));
        assert_eq!(
            render_error(&err, OutputFormat::Text),
            "katamari: command not found: zap"
        );
    }

    #[test]
    fn text_handler_error_has_no_repeated_cause() {
        let err = ShellError::from(DispatchError::Handler {
            command: "build".into(),
            cause: Box::new(OutOfDisk),
        });
        assert_eq!(
            render_error(&err, OutputFormat::Text),
            "katamari: build: out of disk"
        );
    }

    #[test]
    fn text_not_found_with_cause() {
        let err = ShellError::from(DispatchError::from(CommandNotFound::with_cause(
            "deploy", OutOfDisk,
        )));
        assert_eq!(
            render_error(&err, OutputFormat::Text),
            "katamari: command not found: deploy\n  caused by: out of disk"
        );
    }

    #[derive(Debug, thiserror::Error)]
    #[error("write failed: out of disk")]
    struct WriteFailed(#[source] OutOfDisk);

    #[test]
    fn cause_sharing_message_suffix_is_kept() {
        let err = ShellError::from(DispatchError::Handler {
            command: "build".into(),
            cause: Box::new(WriteFailed(OutOfDisk)),
        });
        assert_eq!(
            render_error(&err, OutputFormat::Text),
            "katamari: build: write failed: out of disk\n  caused by: out of disk"
        );
    }

    #[test]
    fn script_error_reports_inner_causes_once() {
        let inner = ShellError::from(DispatchError::from(CommandNotFound::with_cause(
            "deploy", OutOfDisk,
        )));
        let err = ShellError::Script {
            line: 4,
            source: Box::new(inner),
        };
        assert_eq!(
            render_error(&err, OutputFormat::Text),
            "katamari: line 4: command not found: deploy\n  caused by: out of disk"
        );
    }

    #[test]
    fn json_error() {
        let err = ShellError::from(DispatchError::from(CommandNotFound::new("zap")));
        let value: serde_json::Value =
            serde_json::from_str(&render_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["command"], "zap");
        assert_eq!(value["exit_code"], 127);
    }

    #[test]
    fn json_parse_error() {
        let err = ShellError::Tokenize("unterminated double quote".into());
        let value: serde_json::Value =
            serde_json::from_str(&render_error(&err, OutputFormat::Json)).unwrap();
        assert_eq!(value["kind"], "parse_error");
        assert!(value["command"].is_null());
        assert_eq!(value["exit_code"], 2);
    }

    #[test]
    fn exit_statuses() {
        assert_eq!(exit_status(0), 0);
        assert_eq!(exit_status(127), 127);
        assert_eq!(exit_status(-5), 1);
        assert_eq!(exit_status(300), 1);
    }
}
