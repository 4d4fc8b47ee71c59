//! Test utilities for texbuild-lib.
//!
//! The fake engine and converter are shell scripts under `tests/fixtures`,
//! run through `/bin/sh` so they need no executable bit. Integration tests and
//! dependent crates reach this module through the `testutil` feature.

use std::path::PathBuf;

use crate::config::{EngineConfig, ToolConfig};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Engine configuration running `fake-tex.sh`.
pub fn fake_engine() -> EngineConfig {
  let script = fixture_path("fake-tex.sh");
  EngineConfig {
    tool: ToolConfig {
      program: "/bin/sh".to_string(),
      args: vec![
        script.to_string_lossy().into_owned(),
        "-interaction=batchmode".to_string(),
        "-halt-on-error".to_string(),
      ],
    },
    epilogue: Some("\\bye".to_string()),
  }
}

/// Converter configuration running `fake-dvipdf.sh`.
pub fn fake_converter() -> ToolConfig {
  let script = fixture_path("fake-dvipdf.sh");
  ToolConfig {
    program: "/bin/sh".to_string(),
    args: vec![
      script.to_string_lossy().into_owned(),
      "-q".to_string(),
      "-o".to_string(),
      "$${output}".to_string(),
      "$${input}".to_string(),
    ],
  }
}

/// Converter that always fails.
pub fn failing_converter() -> ToolConfig {
  let (program, args) = shell_cmd("echo 'converter crashed' >&2; exit 3");
  ToolConfig {
    program: program.to_string(),
    args,
  }
}
