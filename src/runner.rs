//! External runner process supervision
//!
//! Spawns the test runner with passthrough stdio and always reports a
//! completion value: a runner that fails to start or exits non-zero has its
//! error recorded to `error.txt` in the output directory, and the task
//! chain continues. Cancellation and timeouts are the runner's own
//! business; a hanging runner hangs the task.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::common::{Error, Result};

/// Filename the runner's error payload is written to
pub const ERROR_FILE: &str = "error.txt";

/// How a runner invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Runner exited with status zero
    Success,
    /// Runner exited non-zero; details were recorded to the error file
    Failed,
    /// Runner could not be spawned; details were recorded to the error file
    SpawnFailed,
}

impl RunOutcome {
    pub fn success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Spawn the runner described by `argv` and wait for it to exit
///
/// `argv[0]` is the executable, the rest its arguments. `env` pairs are
/// added to the child's environment. Stdout and stderr are inherited, so
/// runner output streams through unbuffered.
pub async fn run(argv: &[String], env: &[(&str, &str)], output_dir: &Path) -> Result<RunOutcome> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::Config("empty argument vector".to_string()))?;

    tracing::debug!(runner = %program, args = args.len(), "spawning test runner");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .envs(env.iter().copied())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    match cmd.status().await {
        Ok(status) if status.success() => Ok(RunOutcome::Success),
        Ok(status) => {
            record_error(output_dir, &format!("runner '{program}' exited with {status}"))?;
            Ok(RunOutcome::Failed)
        }
        Err(e) => {
            record_error(
                output_dir,
                &format!("failed to spawn runner '{program}': {e}"),
            )?;
            Ok(RunOutcome::SpawnFailed)
        }
    }
}

/// Write the error payload to the error file before completion is reported
fn record_error(output_dir: &Path, message: &str) -> Result<()> {
    let path = output_dir.join(ERROR_FILE);
    tracing::warn!("{message}");
    std::fs::write(&path, message).map_err(|e| Error::file_write(&path, e))
}
