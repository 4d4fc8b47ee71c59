//! Shared constants.

/// Application name, used in messages written on behalf of the engine.
pub const APP_NAME: &str = "texbuild";

/// Base name for artifacts when the configuration does not name one.
pub const DEFAULT_OUTPUT_NAME: &str = "output";

/// Job name passed to the engine. Every engine artifact is named after it.
pub const JOB_NAME: &str = "texput";

/// Extension of staged TeX source files.
pub const SOURCE_EXT: &str = "tex";

/// Prefix of the per-call scratch directory created inside the output directory.
pub const SCRATCH_PREFIX: &str = ".texbuild-";

/// Environment variable overriding the engine program.
pub const ENGINE_ENV: &str = "TEXBUILD_ENGINE";

/// Environment variable overriding the converter program.
pub const CONVERTER_ENV: &str = "TEXBUILD_CONVERTER";
