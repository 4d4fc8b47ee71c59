//! The compilation pipeline.
//!
//! A [`Builder`] runs one self-contained pipeline per call:
//!
//! 1. validate the source and the output directory
//! 2. stage the source into a fresh scratch directory inside the output directory
//! 3. run the engine; the build failed unless it left `texput.dvi` behind
//! 4. optionally convert `texput.dvi` to `texput.pdf`
//! 5. finalize artifacts according to the configuration, success or not
//!
//! The scratch directory is removed at the end of every call. The builder keeps
//! no state between calls besides its configuration.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tempfile::TempDir;
use tokio::fs;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info, warn};

use crate::artifacts::{self, ArtifactKind, Artifacts};
use crate::config::BuildConfig;
use crate::consts::{APP_NAME, JOB_NAME, SCRATCH_PREFIX};
use crate::error::BuildError;
use crate::exec::run_tool;
use crate::placeholder::{ToolContext, substitute_all};
use crate::source::{SourceUnit, StagedSource};
use crate::transcript::{self, TranscriptDiagnostic};

/// Outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
  pub artifacts: Artifacts,
  /// Errors the engine reported in its transcript while still producing output.
  pub diagnostics: Vec<TranscriptDiagnostic>,
  pub engine_code: Option<i32>,
  pub duration: Duration,
}

/// What the tools did inside the scratch directory.
struct Compiled {
  diagnostics: Vec<TranscriptDiagnostic>,
  engine_code: Option<i32>,
}

/// Builds documents with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Builder {
  config: BuildConfig,
}

impl Builder {
  pub fn new(config: BuildConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  /// Build `source`, reporting only whether the build succeeded.
  ///
  /// Every failure, including an absent source, yields `false`. Use
  /// [`Builder::run`] for the reason.
  pub fn build(&self, source: Option<&SourceUnit>) -> bool {
    let Some(source) = source else {
      warn!("build requested without a source");
      return false;
    };

    match self.run_blocking(source) {
      Ok(_) => true,
      Err(e) => {
        warn!(error = %e, kind = ?e.kind(), "build failed");
        false
      }
    }
  }

  /// Run [`Builder::run`] to completion on the calling thread.
  ///
  /// Inside a multi-thread runtime the worker is handed over with
  /// `block_in_place`. A current-thread runtime cannot be blocked, so the build
  /// then runs on a helper thread with its own runtime.
  pub fn run_blocking(&self, source: &SourceUnit) -> Result<BuildReport, BuildError> {
    match Handle::try_current() {
      Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
        tokio::task::block_in_place(|| handle.block_on(self.run(source)))
      }
      Ok(_) => std::thread::scope(|scope| {
        scope
          .spawn(|| self.run_on_own_runtime(source))
          .join()
          .unwrap_or_else(|_| Err(BuildError::Runtime(std::io::Error::other("build thread panicked"))))
      }),
      Err(_) => self.run_on_own_runtime(source),
    }
  }

  fn run_on_own_runtime(&self, source: &SourceUnit) -> Result<BuildReport, BuildError> {
    let rt = tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .map_err(BuildError::Runtime)?;
    rt.block_on(self.run(source))
  }

  /// Build `source` and describe the result.
  pub async fn run(&self, source: &SourceUnit) -> Result<BuildReport, BuildError> {
    let started = Instant::now();
    let output_dir = self.config.output_dir();

    info!(
      source = source.kind(),
      output_dir = ?output_dir,
      name = %self.config.effective_output_name(),
      "starting build"
    );

    if source.is_empty() {
      return Err(BuildError::InvalidInput);
    }
    if !self.config.has_valid_output_name() {
      return Err(BuildError::InvalidOutputName(
        self.config.effective_output_name().to_string(),
      ));
    }
    check_output_dir(&output_dir).await?;

    let scratch = tempfile::Builder::new()
      .prefix(SCRATCH_PREFIX)
      .tempdir_in(&output_dir)
      .map_err(|e| BuildError::filesystem(&output_dir, e))?;
    debug!(scratch = ?scratch.path(), "created scratch directory");

    let compiled = self.compile(scratch.path(), source).await;
    let finalized = artifacts::finalize(scratch.path(), &self.config).await;
    discard_scratch(scratch);

    let (compiled, artifacts) = match (compiled, finalized) {
      (Ok(compiled), Ok(artifacts)) => (compiled, artifacts),
      (Ok(_), Err(fe)) => return Err(fe),
      (Err(e), Ok(_)) => return Err(e),
      (Err(e), Err(fe)) => {
        warn!(error = %fe, "finalization also failed");
        return Err(e);
      }
    };

    let report = BuildReport {
      artifacts,
      diagnostics: compiled.diagnostics,
      engine_code: compiled.engine_code,
      duration: started.elapsed(),
    };
    info!(elapsed = ?report.duration, artifacts = report.artifacts.iter().count(), "build succeeded");
    Ok(report)
  }

  /// Stage, typeset and convert inside `scratch`.
  async fn compile(&self, scratch: &Path, source: &SourceUnit) -> Result<Compiled, BuildError> {
    let staged = source.stage(scratch).await?;
    let compiled = self.typeset(scratch, &staged).await?;
    if self.config.produce_final {
      self.convert(scratch).await?;
    }
    Ok(compiled)
  }

  async fn typeset(&self, scratch: &Path, staged: &StagedSource) -> Result<Compiled, BuildError> {
    let engine = &self.config.engine;
    let context = ToolContext::new(scratch, JOB_NAME).with_input(&staged.path);
    let workdir = staged.workdir(scratch).await;
    let target = std::path::absolute(scratch).map_err(|e| BuildError::filesystem(scratch, e))?;

    let mut args = substitute_all(&engine.tool.args, &context)?;
    args.push(format!("-jobname={}", JOB_NAME));
    args.push(format!("-output-directory={}", target.display()));
    args.push(engine_input(staged, engine.epilogue.as_deref()));

    let transcript_path = ArtifactKind::Transcript.scratch_path(scratch);
    let run = run_tool(&engine.tool.program, &args, &workdir, self.config.timeout_duration()).await;
    let diagnostics = transcript::scan_file(&transcript_path).await;

    let output = match run {
      Ok(output) => output,
      Err(e) => {
        let reason = e.to_string();
        record_failure(&transcript_path, &reason).await;
        return Err(BuildError::Compilation {
          code: None,
          reason,
          diagnostics,
        });
      }
    };

    // Exit codes are unreliable across engines; the DVI file decides.
    let dvi = ArtifactKind::Intermediate.scratch_path(scratch);
    if !exists(&dvi).await {
      let reason = diagnostics
        .first()
        .map(|d| d.message.clone())
        .unwrap_or_else(|| format!("engine produced no {}.dvi", JOB_NAME));
      record_failure(&transcript_path, &reason).await;
      return Err(BuildError::Compilation {
        code: output.code,
        reason,
        diagnostics,
      });
    }

    if !output.success {
      warn!(code = ?output.code, "engine exited with failure but produced output");
    }
    for diagnostic in &diagnostics {
      debug!(message = %diagnostic.message, line = ?diagnostic.line, "transcript error");
    }

    Ok(Compiled {
      diagnostics,
      engine_code: output.code,
    })
  }

  async fn convert(&self, scratch: &Path) -> Result<(), BuildError> {
    let converter = &self.config.converter;
    let dvi = ArtifactKind::Intermediate.scratch_path(scratch);
    let pdf = ArtifactKind::Final.scratch_path(scratch);
    let context = ToolContext::new(scratch, JOB_NAME).with_input(&dvi).with_output(&pdf);

    let args = substitute_all(&converter.args, &context)?;
    let result = run_tool(&converter.program, &args, scratch, self.config.timeout_duration()).await;
    let produced = exists(&pdf).await;

    let failure = match result {
      Err(e) => Some((None, e.to_string())),
      Ok(output) if !output.success => Some((
        output.code,
        output.summary().unwrap_or("converter exited with failure").to_string(),
      )),
      Ok(output) if !produced => Some((output.code, format!("converter produced no {}.pdf", JOB_NAME))),
      Ok(_) => None,
    };

    match failure {
      Some((code, reason)) => {
        // A partial PDF must not reach the output directory.
        if let Err(e) = fs::remove_file(&pdf).await
          && e.kind() != std::io::ErrorKind::NotFound
        {
          return Err(BuildError::filesystem(&pdf, e));
        }
        Err(BuildError::Conversion { code, reason })
      }
      None => Ok(()),
    }
  }
}

/// The last engine argument: the staged file, wrapped in `\input` when an
/// epilogue has to follow it.
fn engine_input(staged: &StagedSource, epilogue: Option<&str>) -> String {
  let file = if staged.owned {
    staged
      .path
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| staged.path.to_string_lossy().into_owned())
  } else {
    staged.path.to_string_lossy().into_owned()
  };
  let file = if file.contains(char::is_whitespace) {
    format!("\"{}\"", file)
  } else {
    file
  };

  match epilogue.map(str::trim).filter(|e| !e.is_empty()) {
    Some(epilogue) => format!("\\input {} {}", file, epilogue),
    None => file,
  }
}

/// Leave a transcript describing `reason` when the engine did not write one,
/// so a requested transcript exists after every attempted build.
async fn record_failure(transcript: &Path, reason: &str) {
  if exists(transcript).await {
    return;
  }
  let text = format!("{} could not typeset the document.\n! {}\n", APP_NAME, reason);
  if let Err(e) = fs::write(transcript, text).await {
    warn!(path = ?transcript, error = %e, "failed to record build failure in transcript");
  }
}

async fn check_output_dir(dir: &Path) -> Result<(), BuildError> {
  let meta = fs::metadata(dir).await.map_err(|e| BuildError::filesystem(dir, e))?;
  if !meta.is_dir() {
    return Err(BuildError::filesystem(
      dir,
      std::io::Error::other("output path is not a directory"),
    ));
  }
  if meta.permissions().readonly() {
    return Err(BuildError::filesystem(
      dir,
      std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    ));
  }
  Ok(())
}

async fn exists(path: &Path) -> bool {
  fs::try_exists(path).await.unwrap_or(false)
}

fn discard_scratch(scratch: TempDir) {
  let path = scratch.path().to_path_buf();
  if let Err(e) = scratch.close() {
    warn!(path = ?path, error = %e, "failed to remove scratch directory");
  }
}
