//! Transcript scanning.
//!
//! TeX engines report errors in the transcript as a line starting with `!`,
//! optionally followed (a few lines later) by an `l.<N> <excerpt>` reference to
//! the offending input line. The builder never decides success from these
//! markers; they are collected to explain a failure.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

/// Lines after an error start that are searched for its line reference.
const LINE_REF_WINDOW: usize = 8;

/// One error reported in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptDiagnostic {
  /// Error text without the leading `! `.
  pub message: String,
  /// Input line number from the `l.<N>` reference, when present.
  pub line: Option<u32>,
  /// Input excerpt printed after the line number.
  pub excerpt: Option<String>,
}

/// Collect error diagnostics from transcript text.
pub fn scan(text: &str) -> Vec<TranscriptDiagnostic> {
  let lines: Vec<&str> = text.lines().collect();
  let mut diagnostics = Vec::new();

  for (idx, line) in lines.iter().enumerate() {
    let Some(message) = line.strip_prefix('!') else {
      continue;
    };

    let mut diagnostic = TranscriptDiagnostic {
      message: message.trim().to_string(),
      line: None,
      excerpt: None,
    };

    for follow in lines.iter().skip(idx + 1).take(LINE_REF_WINDOW) {
      if follow.starts_with('!') {
        break;
      }
      if let Some((number, excerpt)) = parse_line_ref(follow) {
        diagnostic.line = Some(number);
        diagnostic.excerpt = (!excerpt.is_empty()).then(|| excerpt.to_string());
        break;
      }
    }

    diagnostics.push(diagnostic);
  }

  diagnostics
}

/// Read and scan a transcript file. Unreadable transcripts yield nothing.
pub async fn scan_file(path: &Path) -> Vec<TranscriptDiagnostic> {
  match tokio::fs::read(path).await {
    // Transcripts are not guaranteed to be UTF-8 (8-bit input, font names).
    Ok(bytes) => scan(&String::from_utf8_lossy(&bytes)),
    Err(e) => {
      debug!(path = ?path, error = %e, "transcript not readable");
      Vec::new()
    }
  }
}

/// Parse `l.<N> <excerpt>`.
fn parse_line_ref(line: &str) -> Option<(u32, &str)> {
  let rest = line.strip_prefix("l.")?;
  let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
  let number = rest[..digits].parse().ok()?;
  Some((number, rest[digits..].trim()))
}
