//! External interpreter bridge: one OS process per invocation.
//!
//! The bridge spawns the backend script, buffers its full stdout/stderr
//! (no streaming), and enforces a hard wall-clock timeout. It treats the
//! payload as opaque text; envelope decoding happens downstream in the
//! dispatcher so a decode failure is never conflated with an
//! interpreter-reported one.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::Instant;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use crate::env::EnvironmentState;
use crate::error::BridgeError;

/// The canonical unit returned per invocation. Produced exactly once per
/// call; `payload` is the buffered stdout, opaque to the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub succeeded: bool,
    pub payload: String,
    pub failure_reason: Option<String>,
    pub elapsed_millis: u64,
}

/// Wall-clock budgets per invocation. Bulk operations (full-file conversion)
/// get a longer leash than single-property queries.
#[derive(Debug, Clone, Copy)]
pub struct BridgeTimeouts {
    pub query: Duration,
    pub bulk: Duration,
}

impl Default for BridgeTimeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(20),
            bulk: Duration::from_secs(90),
        }
    }
}

impl BridgeTimeouts {
    fn budget_for(&self, operation: &str) -> Duration {
        match operation {
            "ccwrite" | "parse" => self.bulk,
            _ => self.query,
        }
    }
}

/// Seam between the dispatcher and the interpreter process, so tests can
/// substitute a spy.
#[async_trait]
pub trait InterpreterInvoker: Send + Sync {
    async fn invoke(&self, operation: &str, args: &[String])
    -> Result<InvocationResult, BridgeError>;
}

/// The real bridge: `interpreter script operation args...`, no pooling, no
/// reuse, at most one process per call.
pub struct CclibBridge {
    env: Option<EnvironmentState>,
    timeouts: BridgeTimeouts,
}

impl CclibBridge {
    pub fn new(env: Option<EnvironmentState>) -> Self {
        Self {
            env,
            timeouts: BridgeTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: BridgeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }
}

#[async_trait]
impl InterpreterInvoker for CclibBridge {
    async fn invoke(
        &self,
        operation: &str,
        args: &[String],
    ) -> Result<InvocationResult, BridgeError> {
        let Some(env) = self.env.as_ref() else {
            return Err(BridgeError::EnvironmentUnavailable(
                "interpreter environment has not been resolved".to_string(),
            ));
        };
        if !env.is_valid() {
            return Err(BridgeError::EnvironmentUnavailable(format!(
                "missing: {}",
                env.missing.join(", ")
            )));
        }

        let budget = self.timeouts.budget_for(operation);
        let started = Instant::now();
        debug!(operation, ?args, budget_secs = budget.as_secs(), "invoking interpreter");

        let mut command = Command::new(&env.interpreter);
        command
            .arg(&env.script)
            .arg(operation)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the process
            // down with it.
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| BridgeError::Spawn {
            program: env.interpreter.display().to_string(),
            source,
        })?;

        let output = match timeout(budget, child.wait_with_output()).await {
            Err(_elapsed) => {
                warn!(operation, budget_secs = budget.as_secs(), "interpreter timed out");
                return Ok(InvocationResult {
                    succeeded: false,
                    payload: String::new(),
                    failure_reason: Some(format!(
                        "interpreter timed out after {}s",
                        budget.as_secs()
                    )),
                    elapsed_millis: elapsed_millis(started),
                });
            }
            Ok(result) => result?,
        };

        let elapsed = elapsed_millis(started);
        let payload = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            debug!(operation, elapsed_millis = elapsed, "interpreter finished");
            return Ok(InvocationResult {
                succeeded: true,
                payload,
                failure_reason: None,
                elapsed_millis: elapsed,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let reason = if stderr.is_empty() {
            match output.status.code() {
                Some(code) => format!("interpreter exited with status {code}"),
                None => "interpreter terminated by signal".to_string(),
            }
        } else {
            stderr
        };
        warn!(operation, elapsed_millis = elapsed, %reason, "interpreter invocation failed");
        Ok(InvocationResult {
            succeeded: false,
            payload,
            failure_reason: Some(reason),
            elapsed_millis: elapsed,
        })
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
