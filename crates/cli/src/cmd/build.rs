//! Implementation of the `texbuild build` command.
//!
//! Assembles a `BuildConfig` from the configuration file, the environment and
//! the command line, then runs one build and reports its artifacts.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use texbuild_lib::{BuildConfig, BuildError, BuildReport, Builder, SourceUnit, TranscriptDiagnostic};
use tracing::debug;

use super::load_config;
use crate::output::{OutputFormat, format_duration, print_error, print_json, print_stat, print_success, print_warning};

#[derive(Args, Debug)]
pub struct BuildArgs {
  /// TeX source file, or `-` to read from stdin
  #[arg(required_unless_present = "text", conflicts_with = "text")]
  pub source: Option<PathBuf>,

  /// Inline TeX source
  #[arg(long)]
  pub text: Option<String>,

  /// Directory receiving the artifacts (must exist)
  #[arg(short = 'o', long)]
  pub output_dir: Option<PathBuf>,

  /// Base name of the artifacts
  #[arg(short, long)]
  pub name: Option<String>,

  /// Keep the transcript (.log)
  #[arg(long)]
  pub log: bool,

  /// Keep the device-independent output (.dvi)
  #[arg(long)]
  pub dvi: bool,

  /// Produce a PDF
  #[arg(long)]
  pub pdf: bool,

  /// JSON configuration file
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  /// TeX engine program
  #[arg(long)]
  pub engine: Option<String>,

  /// DVI to PDF converter program
  #[arg(long)]
  pub converter: Option<String>,

  /// Limit for each tool run (e.g., "30s", "2m")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub timeout: Option<Duration>,

  /// Output format
  #[arg(long, value_enum, default_value = "text")]
  pub format: OutputFormat,
}

impl BuildArgs {
  /// Command-line options take precedence over the file and the environment.
  fn to_config(&self) -> Result<BuildConfig> {
    let mut config = load_config(self.config.as_deref())?;

    config.retain_transcript |= self.log;
    config.retain_intermediate |= self.dvi;
    config.produce_final |= self.pdf;
    if let Some(dir) = &self.output_dir {
      config.output_dir = dir.clone();
    }
    if let Some(name) = &self.name {
      config.output_name = Some(name.clone());
    }
    if let Some(engine) = &self.engine {
      config.engine.tool.program = engine.clone();
    }
    if let Some(converter) = &self.converter {
      config.converter.program = converter.clone();
    }
    if let Some(timeout) = self.timeout {
      config = config.timeout(timeout);
    }

    Ok(config)
  }

  fn to_source(&self) -> Result<SourceUnit> {
    if let Some(text) = &self.text {
      return Ok(SourceUnit::text(text.as_str()));
    }
    match self.source.as_deref() {
      Some(path) if path == Path::new("-") => {
        let mut text = String::new();
        std::io::stdin()
          .read_to_string(&mut text)
          .context("Failed to read source from stdin")?;
        Ok(SourceUnit::text(text))
      }
      Some(path) => Ok(SourceUnit::file(path)),
      None => bail!("No source given"),
    }
  }
}

/// Execute the build command.
///
/// A failed build is reported in the selected format and then returned as an
/// error so the process exits nonzero.
pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let config = args.to_config()?;
  let source = args.to_source()?;
  debug!(?config, "effective configuration");

  let builder = Builder::new(config);
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  match rt.block_on(builder.run(&source)) {
    Ok(report) => {
      if args.format.is_json() {
        print_json(&serde_json::json!({ "success": true, "report": report }))?;
      } else {
        print_report(&report);
      }
      Ok(())
    }
    Err(e) => {
      if args.format.is_json() {
        print_json(&serde_json::json!({
          "success": false,
          "kind": e.kind(),
          "error": e.to_string(),
          "diagnostics": e.diagnostics(),
        }))?;
      } else {
        print_failure(&e);
      }
      bail!("Build failed");
    }
  }
}

fn print_report(report: &BuildReport) {
  print_success(&format!("Build finished in {}", format_duration(report.duration)));
  let mut any = false;
  for (kind, path) in report.artifacts.iter() {
    print_stat(kind.extension(), &path.display().to_string());
    any = true;
  }
  if !any {
    print_stat("artifacts", "none requested");
  }
  for diagnostic in &report.diagnostics {
    print_warning(&describe(diagnostic));
  }
}

fn print_failure(err: &BuildError) {
  print_error(&err.to_string());
  for diagnostic in err.diagnostics() {
    eprintln!("  {}", describe(diagnostic));
  }
}

fn describe(diagnostic: &TranscriptDiagnostic) -> String {
  match (diagnostic.line, &diagnostic.excerpt) {
    (Some(line), Some(excerpt)) => format!("l.{}: {} ({})", line, diagnostic.message, excerpt),
    (Some(line), None) => format!("l.{}: {}", line, diagnostic.message),
    _ => diagnostic.message.clone(),
  }
}
