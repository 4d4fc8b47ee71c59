//! Artifact finalization.
//!
//! The engine and converter write into the scratch directory under the job
//! name. Finalization runs once per build, successful or not, and leaves in the
//! output directory exactly the artifacts this build produced and was asked to
//! keep.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::consts::JOB_NAME;
use crate::error::BuildError;

/// The files a build can leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
  /// Engine transcript.
  Transcript,
  /// Device-independent output of the engine.
  Intermediate,
  /// Converted portable document.
  Final,
}

impl ArtifactKind {
  pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Transcript, ArtifactKind::Intermediate, ArtifactKind::Final];

  pub fn extension(self) -> &'static str {
    match self {
      ArtifactKind::Transcript => "log",
      ArtifactKind::Intermediate => "dvi",
      ArtifactKind::Final => "pdf",
    }
  }

  /// Where the tools write this artifact inside the scratch directory.
  pub fn scratch_path(self, scratch: &Path) -> PathBuf {
    scratch.join(format!("{}.{}", JOB_NAME, self.extension()))
  }

  fn requested(self, config: &BuildConfig) -> bool {
    match self {
      ArtifactKind::Transcript => config.retain_transcript,
      ArtifactKind::Intermediate => config.retain_intermediate,
      ArtifactKind::Final => config.produce_final,
    }
  }
}

/// Artifacts placed in the output directory by one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artifacts {
  pub transcript: Option<PathBuf>,
  pub intermediate: Option<PathBuf>,
  pub final_document: Option<PathBuf>,
}

impl Artifacts {
  pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
    match kind {
      ArtifactKind::Transcript => self.transcript.as_deref(),
      ArtifactKind::Intermediate => self.intermediate.as_deref(),
      ArtifactKind::Final => self.final_document.as_deref(),
    }
  }

  fn set(&mut self, kind: ArtifactKind, path: PathBuf) {
    match kind {
      ArtifactKind::Transcript => self.transcript = Some(path),
      ArtifactKind::Intermediate => self.intermediate = Some(path),
      ArtifactKind::Final => self.final_document = Some(path),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
    ArtifactKind::ALL
      .into_iter()
      .filter_map(|kind| self.get(kind).map(|path| (kind, path)))
  }
}

/// Move requested artifacts from `scratch` to their destinations and discard
/// the rest.
///
/// Every kind is processed even after a failure; the first error is returned.
/// A destination left over from an earlier build is removed when this build
/// does not replace it.
pub(crate) async fn finalize(scratch: &Path, config: &BuildConfig) -> Result<Artifacts, BuildError> {
  let mut artifacts = Artifacts::default();
  let mut first_error = None;

  for kind in ArtifactKind::ALL {
    match finalize_one(kind, scratch, config).await {
      Ok(Some(path)) => artifacts.set(kind, path),
      Ok(None) => {}
      Err(e) => {
        first_error.get_or_insert(e);
      }
    }
  }

  match first_error {
    Some(e) => Err(e),
    None => Ok(artifacts),
  }
}

async fn finalize_one(kind: ArtifactKind, scratch: &Path, config: &BuildConfig) -> Result<Option<PathBuf>, BuildError> {
  let produced = kind.scratch_path(scratch);
  let destination = config.artifact_path(kind);
  let exists = fs::try_exists(&produced)
    .await
    .map_err(|e| BuildError::filesystem(&produced, e))?;

  if exists && kind.requested(config) {
    move_file(&produced, &destination)
      .await
      .map_err(|e| BuildError::filesystem(&destination, e))?;
    info!(artifact = ?kind, path = ?destination, "artifact kept");
    return Ok(Some(destination));
  }

  if exists {
    fs::remove_file(&produced)
      .await
      .map_err(|e| BuildError::filesystem(&produced, e))?;
    debug!(artifact = ?kind, "artifact discarded");
  }

  remove_stale(&destination)
    .await
    .map_err(|e| BuildError::filesystem(&destination, e))?;
  Ok(None)
}

/// Rename, falling back to copy and delete when the rename is refused.
async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
  remove_stale(to).await?;
  if let Err(e) = fs::rename(from, to).await {
    debug!(from = ?from, to = ?to, error = %e, "rename failed, copying");
    fs::copy(from, to).await?;
    fs::remove_file(from).await?;
  }
  Ok(())
}

async fn remove_stale(path: &Path) -> io::Result<()> {
  match fs::remove_file(path).await {
    Ok(()) => {
      debug!(path = ?path, "removed stale artifact");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}
