//! Failure taxonomy for command execution.
//!
//! Every variant surfaces as exactly one `Failure`-channel output record
//! with a human-readable message; nothing here crosses the session message
//! boundary unconverted, and nothing crashes the dispatcher.

use thiserror::Error;

use crate::envelope::EnvelopeError;

/// Failures raised by the bridge before an interpreter process produces an
/// exit status. Timeouts and non-zero exits are not errors at this level;
/// they are reported inside `InvocationResult`.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("interpreter environment unavailable: {0}")]
    EnvironmentUnavailable(String),
    #[error("failed to spawn interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to collect interpreter output: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can go wrong executing a single command. The dispatcher
/// converts each of these into one failure record.
#[derive(Debug, Error)]
pub enum CommandFailure {
    /// Missing required argument; resolved locally, the bridge is never
    /// invoked.
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// The interpreter process ran but did not succeed (timeout or non-zero
    /// exit); the message is the bridge's failure reason.
    #[error("{0}")]
    Invocation(String),
    /// The process exited cleanly but its output did not match the expected
    /// response envelope. Deliberately distinct from
    /// [`CommandFailure::InterpreterReported`].
    #[error("unexpected interpreter output: {0}")]
    ResponseDecode(#[from] EnvelopeError),
    /// The envelope decoded but carried `success: false`.
    #[error("{0}")]
    InterpreterReported(String),
}
