//! Error types for a build attempt.

use std::path::PathBuf;

use thiserror::Error;

use crate::placeholder::PlaceholderError;
use crate::transcript::TranscriptDiagnostic;

/// Coarse failure category, for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  InvalidInput,
  Staging,
  Compilation,
  Conversion,
  Filesystem,
  Internal,
}

/// Errors that can occur during a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// No source, or a source without payload.
  #[error("no TeX source was supplied")]
  InvalidInput,

  /// The output name would place artifacts outside the output directory.
  #[error("output name {0:?} must be a plain file name")]
  InvalidOutputName(String),

  /// The source could not be made available to the engine.
  #[error("failed to stage source {path}: {source}")]
  Staging {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The engine did not produce the intermediate file.
  #[error("compilation failed (exit code {code:?}): {reason}")]
  Compilation {
    code: Option<i32>,
    reason: String,
    diagnostics: Vec<TranscriptDiagnostic>,
  },

  /// The intermediate file could not be converted to the final document.
  #[error("conversion failed (exit code {code:?}): {reason}")]
  Conversion { code: Option<i32>, reason: String },

  /// A converter argument template could not be resolved.
  #[error("invalid tool arguments: {0}")]
  Placeholder(#[from] PlaceholderError),

  /// The output directory is unusable or an artifact could not be moved.
  #[error("filesystem error at {path}: {source}")]
  Filesystem {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The async runtime driving a blocking build could not be created.
  #[error("failed to start build runtime: {0}")]
  Runtime(#[source] std::io::Error),
}

impl BuildError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::InvalidInput | BuildError::InvalidOutputName(_) => ErrorKind::InvalidInput,
      BuildError::Staging { .. } => ErrorKind::Staging,
      BuildError::Compilation { .. } => ErrorKind::Compilation,
      BuildError::Conversion { .. } | BuildError::Placeholder(_) => ErrorKind::Conversion,
      BuildError::Filesystem { .. } => ErrorKind::Filesystem,
      BuildError::Runtime(_) => ErrorKind::Internal,
    }
  }

  /// Transcript diagnostics attached to a compilation failure.
  pub fn diagnostics(&self) -> &[TranscriptDiagnostic] {
    match self {
      BuildError::Compilation { diagnostics, .. } => diagnostics,
      _ => &[],
    }
  }

  pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    BuildError::Filesystem {
      path: path.into(),
      source,
    }
  }
}
