//! Shared test helpers for library integration tests.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use texbuild_lib::util::testutil::{fake_converter, fake_engine};
use texbuild_lib::{BuildConfig, Builder};

pub const SIMPLE: &str = "Hello World";

pub const COMPLEX: &str = concat!(
  "\\hrule",
  "\\vskip 1in",
  "\\centerline{\\bf A SHORT STORY}",
  "\\vskip 6pt",
  "\\centerline{\\sl by A. U. Thor}",
  "\\vskip .5cm",
  "Once upon a time, in a distant ",
  "galaxy called \\\"O\\\"o\\c c, ",
  "there lived a computer ",
  "named R.~J. Drofnats. ",
  "\\par Mr.~Drofnats---or ``R. J.,'' as ",
  "he preferred to be called--- ",
  "was happiest when he was at work ",
  "typesetting beautiful documents.",
  "\\vskip 1in",
  "\\hrule",
  "\\vfill\\eject",
);

pub const INVALID: &str = "Some valid TeX followed by an invalid command ( \\invCMD ). And finally more content";

/// A builder wired to the fake tools.
///
/// Flags are (transcript, intermediate, final), in that order.
pub fn builder(flags: (bool, bool, bool), name: Option<&str>, dir: &Path) -> Builder {
  let mut config = BuildConfig::new(dir)
    .retain_transcript(flags.0)
    .retain_intermediate(flags.1)
    .produce_final(flags.2)
    .engine(fake_engine())
    .converter(fake_converter());
  if let Some(name) = name {
    config = config.output_name(name);
  }
  Builder::new(config)
}

/// Directories prepared once for a group of tests.
#[derive(Debug, Clone)]
pub struct TestDirs {
  /// Cleared at setup; tests remove what they create.
  pub temporary: PathBuf,
  /// Cleared at setup; outputs are left for manual inspection.
  pub persistent: PathBuf,
}

/// One-time preparation of [`TestDirs`] under a root directory.
///
/// The first successful `setup` wipes and recreates both directories; later
/// calls return the same paths without touching the filesystem.
pub struct TestSetup {
  dirs: TestDirs,
  prepared: bool,
}

impl TestSetup {
  pub fn new(root: &Path) -> Self {
    Self {
      dirs: TestDirs {
        temporary: root.join("temp"),
        persistent: root.join("actual"),
      },
      prepared: false,
    }
  }

  pub fn setup(&mut self) -> io::Result<TestDirs> {
    if self.prepared {
      return Ok(self.dirs.clone());
    }

    for dir in [&self.dirs.temporary, &self.dirs.persistent] {
      match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
      }
      std::fs::create_dir_all(dir)?;
    }

    self.prepared = true;
    Ok(self.dirs.clone())
  }
}

/// Isolated test environment: a temp root with prepared [`TestDirs`].
pub struct TestEnv {
  _temp: TempDir,
  pub dirs: TestDirs,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let dirs = TestSetup::new(temp.path()).setup().unwrap();
    Self { _temp: temp, dirs }
  }

  pub fn out(&self) -> &Path {
    &self.dirs.temporary
  }

  /// Write a source file into the temporary directory.
  pub fn write_source(&self, name: &str, content: &str) -> PathBuf {
    let path = self.dirs.temporary.join(name);
    std::fs::write(&path, format!("{}\n", content)).unwrap();
    path
  }

  /// Artifact path `<temporary>/<name>.<ext>`.
  pub fn artifact(&self, name: &str, ext: &str) -> PathBuf {
    self.dirs.temporary.join(format!("{}.{}", name, ext))
  }
}

/// Names in `dir`, sorted.
pub fn entries(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}
