//! Terminal output for the CLI.
//!
//! Status lines carry a colored symbol when the stream supports color. Success
//! goes to stdout, problems to stderr. JSON output is pretty-printed to stdout.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
  Success,
  Warning,
  Error,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Warning => "⚠",
      Status::Error => "✗",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Success => Stream::Stdout,
      Status::Warning | Status::Error => Stream::Stderr,
    }
  }
}

fn print_status(status: Status, message: &str) {
  let stream = status.stream();
  let symbol = status.symbol();
  let line = match status {
    Status::Success => format!("{} {}", symbol.if_supports_color(stream, |s| s.green()), message),
    Status::Warning => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.yellow()),
      message.if_supports_color(stream, |s| s.yellow())
    ),
    Status::Error => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.red()),
      message.if_supports_color(stream, |s| s.red())
    ),
  };

  match stream {
    Stream::Stdout => println!("{}", line),
    _ => eprintln!("{}", line),
  }
}

pub fn print_success(message: &str) {
  print_status(Status::Success, message);
}

pub fn print_warning(message: &str) {
  print_status(Status::Warning, message);
}

pub fn print_error(message: &str) {
  print_status(Status::Error, message);
}

/// Indented `label: value` line under a status line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// Human-readable duration at millisecond precision, e.g. `1s 250ms`.
pub fn format_duration(duration: Duration) -> String {
  let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
  if millis == 0 {
    return "0ms".to_string();
  }
  humantime::format_duration(Duration::from_millis(millis)).to_string()
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
