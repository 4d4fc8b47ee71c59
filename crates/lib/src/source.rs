//! TeX source units.
//!
//! A [`SourceUnit`] is either inline text or a reference to a file on disk.
//! Neither variant validates its payload on construction; the builder rejects
//! empty units when a build is attempted.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::consts::{JOB_NAME, SOURCE_EXT};
use crate::error::BuildError;

/// A unit of TeX source handed to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceUnit {
  /// Source text held in memory.
  Text(Option<String>),
  /// Path to an existing source file.
  File(Option<PathBuf>),
}

impl SourceUnit {
  pub fn text(text: impl Into<String>) -> Self {
    SourceUnit::Text(Some(text.into()))
  }

  pub fn file(path: impl Into<PathBuf>) -> Self {
    SourceUnit::File(Some(path.into()))
  }

  /// True when the unit carries no usable payload.
  ///
  /// Empty text counts as absent, as does an empty path.
  pub fn is_empty(&self) -> bool {
    match self {
      SourceUnit::Text(text) => text.as_deref().is_none_or(str::is_empty),
      SourceUnit::File(path) => path.as_deref().is_none_or(|p| p.as_os_str().is_empty()),
    }
  }

  /// Short label for logs.
  pub fn kind(&self) -> &'static str {
    match self {
      SourceUnit::Text(_) => "text",
      SourceUnit::File(_) => "file",
    }
  }

  /// Materialize the unit as a file the engine can read.
  ///
  /// Text is written to `<scratch>/texput.tex`. File references are returned as
  /// absolute paths and never copied. A reference that does not name a readable
  /// file is still handed over; the engine reports it in its transcript.
  pub(crate) async fn stage(&self, scratch: &Path) -> Result<StagedSource, BuildError> {
    match self {
      SourceUnit::Text(Some(text)) => {
        let path = scratch.join(format!("{}.{}", JOB_NAME, SOURCE_EXT));
        fs::write(&path, text).await.map_err(|source| BuildError::Staging {
          path: path.clone(),
          source,
        })?;
        debug!(path = ?path, bytes = text.len(), "staged inline source");
        Ok(StagedSource { path, owned: true })
      }
      SourceUnit::File(Some(path)) => {
        let readable = fs::metadata(path).await.is_ok_and(|meta| meta.is_file());
        let absolute = if readable {
          dunce::canonicalize(path)
        } else {
          std::path::absolute(path)
        }
        .map_err(|source| BuildError::Staging {
          path: path.clone(),
          source,
        })?;

        if readable {
          debug!(path = ?absolute, "using source file in place");
        } else {
          warn!(path = ?absolute, "source file is not readable, leaving it to the engine");
        }
        Ok(StagedSource {
          path: absolute,
          owned: false,
        })
      }
      SourceUnit::Text(None) | SourceUnit::File(None) => Err(BuildError::InvalidInput),
    }
  }
}

impl From<String> for SourceUnit {
  fn from(text: String) -> Self {
    SourceUnit::text(text)
  }
}

impl From<&str> for SourceUnit {
  fn from(text: &str) -> Self {
    SourceUnit::text(text)
  }
}

impl From<PathBuf> for SourceUnit {
  fn from(path: PathBuf) -> Self {
    SourceUnit::file(path)
  }
}

/// A source file ready for the engine.
#[derive(Debug, Clone)]
pub(crate) struct StagedSource {
  pub path: PathBuf,
  /// Whether the file lives in the scratch directory (and goes away with it).
  pub owned: bool,
}

impl StagedSource {
  /// Directory the engine runs in, so relative `\input`s resolve next to the
  /// document. Falls back to `scratch` for staged text and for files whose
  /// directory does not exist.
  pub async fn workdir(&self, scratch: &Path) -> PathBuf {
    if !self.owned
      && let Some(parent) = self.path.parent()
      && fs::metadata(parent).await.is_ok_and(|meta| meta.is_dir())
    {
      return parent.to_path_buf();
    }
    scratch.to_path_buf()
  }
}
