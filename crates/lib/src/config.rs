//! Build configuration.
//!
//! A [`BuildConfig`] is fixed when a [`Builder`](crate::builder::Builder) is
//! created and reused for every build it runs. It can be assembled fluently,
//! deserialized from JSON, and have its tool programs overridden from the
//! environment.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::artifacts::ArtifactKind;
use crate::consts::{CONVERTER_ENV, DEFAULT_OUTPUT_NAME, ENGINE_ENV};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// An external program and its argument templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
}

impl ToolConfig {
  pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
    Self {
      program: program.into(),
      args: args.iter().map(|s| s.to_string()).collect(),
    }
  }
}

/// The TeX engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
  #[serde(flatten)]
  pub tool: ToolConfig,
  /// Appended after `\input <file>` on the command line. Plain TeX needs `\bye`
  /// here to ship out pages of documents that do not end themselves.
  #[serde(default)]
  pub epilogue: Option<String>,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      tool: ToolConfig::new("tex", &["-interaction=batchmode", "-halt-on-error"]),
      epilogue: Some("\\bye".to_string()),
    }
  }
}

fn default_converter() -> ToolConfig {
  ToolConfig::new("dvipdfmx", &["-q", "-o", "$${output}", "$${input}"])
}

/// Options for a [`Builder`](crate::builder::Builder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
  /// Keep the engine transcript as `<name>.log`.
  pub retain_transcript: bool,
  /// Keep the device-independent output as `<name>.dvi`.
  pub retain_intermediate: bool,
  /// Convert to `<name>.pdf`.
  pub produce_final: bool,
  /// Artifact base name; [`DEFAULT_OUTPUT_NAME`] when unset or blank.
  pub output_name: Option<String>,
  /// Existing directory receiving the artifacts.
  pub output_dir: PathBuf,
  pub engine: EngineConfig,
  pub converter: ToolConfig,
  /// Upper bound for each subprocess wait. No limit when unset.
  pub timeout_secs: Option<u64>,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      retain_transcript: false,
      retain_intermediate: false,
      produce_final: false,
      output_name: None,
      output_dir: PathBuf::from("."),
      engine: EngineConfig::default(),
      converter: default_converter(),
      timeout_secs: None,
    }
  }
}

impl BuildConfig {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
      ..Self::default()
    }
  }

  pub fn retain_transcript(mut self, yes: bool) -> Self {
    self.retain_transcript = yes;
    self
  }

  pub fn retain_intermediate(mut self, yes: bool) -> Self {
    self.retain_intermediate = yes;
    self
  }

  pub fn produce_final(mut self, yes: bool) -> Self {
    self.produce_final = yes;
    self
  }

  pub fn output_name(mut self, name: impl Into<String>) -> Self {
    self.output_name = Some(name.into());
    self
  }

  pub fn engine(mut self, engine: EngineConfig) -> Self {
    self.engine = engine;
    self
  }

  pub fn converter(mut self, converter: ToolConfig) -> Self {
    self.converter = converter;
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout_secs = Some(timeout.as_secs().max(1));
    self
  }

  /// Load a configuration from a JSON file. Missing fields take their defaults.
  pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Replace tool programs from `TEXBUILD_ENGINE` / `TEXBUILD_CONVERTER`.
  pub fn apply_env_overrides(&mut self) {
    if let Some(program) = env_program(ENGINE_ENV) {
      debug!(program = %program, "engine overridden from environment");
      self.engine.tool.program = program;
    }
    if let Some(program) = env_program(CONVERTER_ENV) {
      debug!(program = %program, "converter overridden from environment");
      self.converter.program = program;
    }
  }

  /// The artifact base name in effect.
  pub fn effective_output_name(&self) -> &str {
    self
      .output_name
      .as_deref()
      .map(str::trim)
      .filter(|name| !name.is_empty())
      .unwrap_or(DEFAULT_OUTPUT_NAME)
  }

  /// Whether the artifact base name is a plain file name, so every artifact
  /// lands directly inside the output directory.
  pub fn has_valid_output_name(&self) -> bool {
    let name = self.effective_output_name();
    let mut components = Path::new(name).components();
    !name.contains(std::path::is_separator)
      && matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
      )
  }

  /// The output directory with trailing separators removed.
  pub fn output_dir(&self) -> PathBuf {
    let normalized: PathBuf = self.output_dir.components().collect();
    if normalized.as_os_str().is_empty() {
      PathBuf::from(".")
    } else {
      normalized
    }
  }

  /// Destination of an artifact: `<output_dir>/<name>.<ext>`.
  pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
    self
      .output_dir()
      .join(format!("{}.{}", self.effective_output_name(), kind.extension()))
  }

  pub fn timeout_duration(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }
}

fn env_program(var: &str) -> Option<String> {
  std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
