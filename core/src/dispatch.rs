//! Routes a parsed command to the interpreter bridge or to a local
//! in-panel action, and converts every failure into exactly one
//! failure-channel record.

use std::path::PathBuf;
use std::sync::Arc;

use ccview_protocol::OutputRecord;
use serde_json::Value;
use tracing::debug;
use tracing::warn;

use crate::bridge::InterpreterInvoker;
use crate::command::Command;
use crate::command::CommandKind;
use crate::command::help_text;
use crate::envelope;
use crate::error::CommandFailure;

/// Per-session context threaded explicitly into every dispatch, instead of
/// living in process-wide state. `current_subject` is the data file the
/// panel was opened for; it backs the optional file argument of `ccget` and
/// `ccwrite`.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub current_subject: Option<PathBuf>,
}

impl SessionContext {
    pub fn with_subject(subject: impl Into<PathBuf>) -> Self {
        Self {
            current_subject: Some(subject.into()),
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    invoker: Arc<dyn InterpreterInvoker>,
}

impl Dispatcher {
    pub fn new(invoker: Arc<dyn InterpreterInvoker>) -> Self {
        Self { invoker }
    }

    /// Execute one command to completion. Never panics and never returns an
    /// error: failures come back as failure records, in output order.
    pub async fn execute(&self, cmd: &Command, ctx: &SessionContext) -> Vec<OutputRecord> {
        debug!(verb = cmd.kind.verb(), unrecognized = cmd.was_unrecognized, "dispatching");
        match cmd.kind {
            CommandKind::Help => vec![OutputRecord::primary(help_text())],
            // Empty content tells the presentation channels to reset.
            CommandKind::Clear => vec![OutputRecord::primary(String::new())],
            // Scene scripts never touch the bridge: the session relays the
            // script to the viewer context and the outcome arrives later as
            // a separate message. Here we only leave a transcript trace.
            CommandKind::SceneScript => vec![OutputRecord::diagnostic(format!(
                "viewer script forwarded: {}",
                cmd.arguments.join(" ")
            ))],
            CommandKind::DataQuery | CommandKind::DataExport => {
                let record = match self.run_data_command(cmd, ctx).await {
                    Ok(record) => record,
                    Err(failure) => {
                        warn!(verb = cmd.kind.verb(), %failure, "command failed");
                        OutputRecord::failure(failure.to_string())
                    }
                };
                vec![record]
            }
        }
    }

    async fn run_data_command(
        &self,
        cmd: &Command,
        ctx: &SessionContext,
    ) -> Result<OutputRecord, CommandFailure> {
        let Some(target) = cmd.arguments.first() else {
            return Err(CommandFailure::Usage(format!(
                "usage: {}",
                cmd.kind.usage()
            )));
        };
        let subject = cmd
            .arguments
            .get(1)
            .cloned()
            .or_else(|| {
                ctx.current_subject
                    .as_ref()
                    .map(|path| path.display().to_string())
            })
            .ok_or_else(|| {
                CommandFailure::Usage(format!(
                    "no data file is open; usage: {}",
                    cmd.kind.usage()
                ))
            })?;

        // Backend argv order is `<file> <target>` for both operations.
        let args = vec![subject, target.clone()];
        let result = self.invoker.invoke(cmd.kind.verb(), &args).await?;
        if !result.succeeded {
            return Err(CommandFailure::Invocation(
                result
                    .failure_reason
                    .unwrap_or_else(|| "interpreter invocation failed".to_string()),
            ));
        }

        let decoded = envelope::decode(&result.payload)?;
        if !decoded.success {
            return Err(CommandFailure::InterpreterReported(
                decoded
                    .error
                    .unwrap_or_else(|| "interpreter reported an unspecified error".to_string()),
            ));
        }
        let value = decoded.value.unwrap_or(Value::Null);
        Ok(OutputRecord::primary(envelope::render_value(&value)))
    }
}
