//! Commands backed by an nREPL connection.

use std::sync::Arc;
use std::time::Duration;

use katamari_dispatch::{
    Arity, BoxError, Command, CommandOutput, CommandRegistry, Context, RegistryError,
};

use crate::client::eval;
use crate::connect::ConnectorRegistry;
use crate::connection::WatchableConnection;
use crate::error::NreplError;

/// Shell variable overriding the eval timeout, in seconds.
pub const TIMEOUT_VAR: &str = "NREPL_TIMEOUT";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Register the nREPL commands, connecting through `connectors`.
pub fn register_commands(
    reg: &mut CommandRegistry,
    connectors: Arc<ConnectorRegistry>,
) -> Result<(), RegistryError> {
    reg.register_command(EvalCmd { connectors })?;
    Ok(())
}

struct EvalCmd {
    connectors: Arc<ConnectorRegistry>,
}

impl Command for EvalCmd {
    fn name(&self) -> &str {
        "nrepl-eval"
    }
    fn description(&self) -> &str {
        "Evaluate code on an nREPL server"
    }
    fn usage(&self) -> &str {
        "nrepl-eval <uri> <code>"
    }
    fn category(&self) -> &str {
        "nrepl"
    }
    fn arity(&self) -> Arity {
        Arity::Exactly(2)
    }
    fn execute(&self, args: &[&str], ctx: &mut Context) -> Result<CommandOutput, BoxError> {
        let timeout = match ctx.var(TIMEOUT_VAR) {
            Some(raw) => {
                let secs: f64 = raw
                    .parse()
                    .map_err(|e| format!("invalid {TIMEOUT_VAR} {raw:?}: {e}"))?;
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| format!("invalid {TIMEOUT_VAR} {raw:?}: {e}"))?
            },
            None => DEFAULT_TIMEOUT,
        };

        let conn = WatchableConnection::new(self.connectors.connect(args[0])?)?;
        let result = eval(&conn, args[1], timeout);
        conn.close();
        let result = result?;

        if let Some(ex) = result.ex {
            return Err(NreplError::Eval {
                ex,
                err: result.err,
            }
            .into());
        }
        Ok(CommandOutput::Text(result.render()))
    }
}
