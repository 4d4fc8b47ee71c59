//! Placeholder templates for tool arguments.
//!
//! Tool arguments are configured before the scratch directory of a build
//! exists, so paths are written as placeholders and resolved per call.
//!
//! # Placeholder Formats
//!
//! - `$${input}` - the file the tool reads
//! - `$${output}` - the file the tool is expected to write
//! - `$${job}` - the engine job name
//! - `$${workdir}` - the scratch directory the tool runs in
//!
//! A single `$` passes through unchanged. `$$${` produces a literal `$${`.
//!
//! # Example
//!
//! ```
//! use texbuild_lib::placeholder::{parse, Placeholder, Segment};
//!
//! let segments = parse("-o$${output}").unwrap();
//! assert_eq!(segments, vec![
//!     Segment::Literal("-o".to_string()),
//!     Segment::Placeholder(Placeholder::Output),
//! ]);
//! ```

use std::path::Path;

use thiserror::Error;

/// A parsed placeholder reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  Input,
  Output,
  Job,
  Workdir,
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Placeholder(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
  #[error("unclosed placeholder at position {0}")]
  Unclosed(usize),

  #[error("unknown placeholder: {0}")]
  Unknown(String),

  #[error("placeholder '{0}' has no value for this tool")]
  Unresolved(&'static str),
}

impl Placeholder {
  pub fn name(self) -> &'static str {
    match self {
      Placeholder::Input => "input",
      Placeholder::Output => "output",
      Placeholder::Job => "job",
      Placeholder::Workdir => "workdir",
    }
  }
}

/// Supplies values for placeholders.
pub trait Resolver {
  fn resolve(&self, placeholder: Placeholder) -> Result<&str, PlaceholderError>;
}

/// Values known for one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
  pub input: Option<String>,
  pub output: Option<String>,
  pub job: Option<String>,
  pub workdir: Option<String>,
}

impl ToolContext {
  pub fn new(workdir: &Path, job: &str) -> Self {
    Self {
      workdir: Some(workdir.to_string_lossy().into_owned()),
      job: Some(job.to_string()),
      ..Self::default()
    }
  }

  pub fn with_input(mut self, input: &Path) -> Self {
    self.input = Some(input.to_string_lossy().into_owned());
    self
  }

  pub fn with_output(mut self, output: &Path) -> Self {
    self.output = Some(output.to_string_lossy().into_owned());
    self
  }
}

impl Resolver for ToolContext {
  fn resolve(&self, placeholder: Placeholder) -> Result<&str, PlaceholderError> {
    let value = match placeholder {
      Placeholder::Input => &self.input,
      Placeholder::Output => &self.output,
      Placeholder::Job => &self.job,
      Placeholder::Workdir => &self.workdir,
    };
    value.as_deref().ok_or(PlaceholderError::Unresolved(placeholder.name()))
  }
}

/// Parse a template into literal and placeholder segments.
pub fn parse(input: &str) -> Result<Vec<Segment>, PlaceholderError> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut chars = input.char_indices().peekable();

  while let Some((pos, ch)) = chars.next() {
    if ch != '$' {
      literal.push(ch);
      continue;
    }

    if !matches!(chars.peek(), Some((_, '$'))) {
      literal.push('$');
      continue;
    }
    chars.next();

    match chars.peek() {
      Some((_, '$')) => {
        chars.next();
        if matches!(chars.peek(), Some((_, '{'))) {
          chars.next();
          literal.push_str("$${");
        } else {
          literal.push_str("$$$");
        }
      }
      Some((_, '{')) => {
        chars.next();

        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        let mut closed = false;
        for (_, c) in chars.by_ref() {
          if c == '}' {
            closed = true;
            break;
          }
          name.push(c);
        }
        if !closed {
          return Err(PlaceholderError::Unclosed(pos));
        }

        segments.push(Segment::Placeholder(parse_name(&name)?));
      }
      _ => literal.push_str("$$"),
    }
  }

  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  Ok(segments)
}

fn parse_name(name: &str) -> Result<Placeholder, PlaceholderError> {
  match name.trim() {
    "input" => Ok(Placeholder::Input),
    "output" => Ok(Placeholder::Output),
    "job" => Ok(Placeholder::Job),
    "workdir" => Ok(Placeholder::Workdir),
    other => Err(PlaceholderError::Unknown(other.to_string())),
  }
}

/// Parse and resolve a template in one step.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<String, PlaceholderError> {
  let segments = parse(input)?;
  let mut result = String::with_capacity(input.len());

  for segment in &segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(p) => result.push_str(resolver.resolve(*p)?),
    }
  }

  Ok(result)
}

/// Resolve every argument of a tool invocation.
pub fn substitute_all(args: &[String], resolver: &impl Resolver) -> Result<Vec<String>, PlaceholderError> {
  args.iter().map(|arg| substitute(arg, resolver)).collect()
}
