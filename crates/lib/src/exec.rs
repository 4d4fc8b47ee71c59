//! External tool execution.
//!
//! Both the engine and the converter run through [`run_tool`]: a
//! non-interactive child process with stdin closed, captured output, and an
//! optional wall-clock limit.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ExecError {
  /// The program could not be started (not installed, not executable, ...).
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The program did not finish within the configured limit and was killed.
  #[error("{program} timed out after {after:?}")]
  TimedOut { program: String, after: Duration },
}

/// Captured result of a finished tool.
#[derive(Debug, Clone)]
pub struct ToolOutput {
  pub code: Option<i32>,
  pub success: bool,
  pub stdout: String,
  pub stderr: String,
  pub duration: Duration,
}

impl ToolOutput {
  /// Last non-empty stderr line, falling back to stdout. Used in error messages.
  pub fn summary(&self) -> Option<&str> {
    [&self.stderr, &self.stdout]
      .into_iter()
      .find_map(|stream| stream.lines().rev().map(str::trim).find(|l| !l.is_empty()))
  }
}

/// Run `program` with `args` inside `cwd` and wait for it.
///
/// A nonzero exit is not an error here; callers decide from the files the
/// tool left behind.
pub async fn run_tool(
  program: &str,
  args: &[String],
  cwd: &Path,
  timeout: Option<Duration>,
) -> Result<ToolOutput, ExecError> {
  info!(program = %program, "running tool");
  debug!(args = ?args, cwd = ?cwd, timeout = ?timeout, "spawning process");

  let mut command = Command::new(program);
  command
    .args(args)
    .current_dir(cwd)
    .stdin(Stdio::null())
    .kill_on_drop(true);

  let started = Instant::now();
  let pending = command.output();

  let result = match timeout {
    Some(limit) => match tokio::time::timeout(limit, pending).await {
      Ok(result) => result,
      Err(_) => {
        warn!(program = %program, after = ?limit, "tool timed out, killed");
        return Err(ExecError::TimedOut {
          program: program.to_string(),
          after: limit,
        });
      }
    },
    None => pending.await,
  };

  let output = result.map_err(|source| ExecError::Spawn {
    program: program.to_string(),
    source,
  })?;

  let tool_output = ToolOutput {
    code: output.status.code(),
    success: output.status.success(),
    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    duration: started.elapsed(),
  };

  if !tool_output.stderr.trim().is_empty() {
    debug!(stderr = %tool_output.stderr.trim(), "tool stderr");
  }
  debug!(
    program = %program,
    code = ?tool_output.code,
    elapsed = ?tool_output.duration,
    "tool finished"
  );

  Ok(tool_output)
}
