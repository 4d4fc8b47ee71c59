//! texbuild-lib: build documents from TeX source with an external engine.
//!
//! This crate drives a TeX-compatible engine and a DVI converter as external
//! processes and manages the files they produce:
//! - `SourceUnit`: inline TeX text or a path to a source file
//! - `BuildConfig`: which artifacts to keep, where, and under which name
//! - `Builder`: runs the stage → typeset → convert → finalize pipeline
//!
//! ```no_run
//! use texbuild_lib::{BuildConfig, Builder, SourceUnit};
//!
//! let config = BuildConfig::new("out").retain_transcript(true).produce_final(true);
//! let builder = Builder::new(config);
//! assert!(builder.build(Some(&SourceUnit::text("Hello World"))));
//! ```

pub mod artifacts;
pub mod builder;
pub mod config;
pub mod consts;
pub mod error;
pub mod exec;
pub mod placeholder;
pub mod source;
pub mod transcript;
pub mod util;

pub use artifacts::{ArtifactKind, Artifacts};
pub use builder::{BuildReport, Builder};
pub use config::{BuildConfig, ConfigError, EngineConfig, ToolConfig};
pub use error::{BuildError, ErrorKind};
pub use source::SourceUnit;
pub use transcript::TranscriptDiagnostic;
