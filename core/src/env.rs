//! Resolved state of the external interpreter environment.
//!
//! The bridge consumes this read-only: it never re-probes, it only fails
//! fast when the state is absent or invalid.

use std::path::Path;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::warn;

/// Python modules the backend script cannot run without.
pub const REQUIRED_CAPABILITIES: &[&str] = &["cclib"];

/// Modules the backend degrades gracefully without; a miss is only logged.
pub const ADVISORY_CAPABILITIES: &[&str] = &["numpy"];

/// Resolved interpreter path plus the outcome of the capability checklist.
#[derive(Debug, Clone)]
pub struct EnvironmentState {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    /// Required capabilities (or the backend script itself) that failed the
    /// probe. Empty means the environment is usable.
    pub missing: Vec<String>,
}

impl EnvironmentState {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Probe the interpreter and backend script once, up front.
///
/// Returns `Err` only when the interpreter itself cannot be executed;
/// missing modules or a missing script are recorded in
/// [`EnvironmentState::missing`] so the bridge can report them distinctly.
pub async fn resolve_environment(
    interpreter: PathBuf,
    script: PathBuf,
) -> std::io::Result<EnvironmentState> {
    let mut missing = Vec::new();

    if !script.is_file() {
        missing.push(format!("backend script {}", script.display()));
    }

    for capability in REQUIRED_CAPABILITIES.iter().copied() {
        if !probe_import(&interpreter, capability).await? {
            missing.push(capability.to_string());
        }
    }
    for capability in ADVISORY_CAPABILITIES.iter().copied() {
        if !probe_import(&interpreter, capability).await? {
            warn!(capability, "advisory interpreter capability unavailable");
        }
    }

    Ok(EnvironmentState {
        interpreter,
        script,
        missing,
    })
}

async fn probe_import(interpreter: &Path, module: &str) -> std::io::Result<bool> {
    let status = Command::new(interpreter)
        .arg("-c")
        .arg(format!("import {module}"))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_invalidate_the_state() {
        let state = EnvironmentState {
            interpreter: PathBuf::from("python3"),
            script: PathBuf::from("backend.py"),
            missing: vec!["cclib".to_string()],
        };
        assert!(!state.is_valid());
    }

    #[tokio::test]
    async fn resolve_records_missing_script() {
        // `true` accepts and ignores any argv, so every import probe passes.
        let state = resolve_environment(
            PathBuf::from("true"),
            PathBuf::from("/nonexistent/backend.py"),
        )
        .await
        .expect("probe interpreter");
        assert!(!state.is_valid());
        assert!(state.missing[0].contains("backend.py"));
    }

    #[tokio::test]
    async fn resolve_fails_when_interpreter_is_not_executable() {
        let result = resolve_environment(
            PathBuf::from("/nonexistent/python3"),
            PathBuf::from("/nonexistent/backend.py"),
        )
        .await;
        assert!(result.is_err());
    }
}
