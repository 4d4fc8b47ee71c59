//! Builds from source files on disk.

use texbuild_lib::{ErrorKind, SourceUnit};

use super::common::{COMPLEX, INVALID, SIMPLE, TestEnv, builder, entries};

#[test]
fn transcript_kept_only_when_requested() {
  let env = TestEnv::new();
  let source = SourceUnit::file(env.write_source("simple.tex", SIMPLE));
  let log = env.artifact("output", "log");

  assert!(builder((false, false, false), None, env.out()).build(Some(&source)));
  assert!(!log.exists());
  assert!(builder((true, false, false), None, env.out()).build(Some(&source)));
  assert!(log.exists());
  assert_eq!(entries(env.out()), vec!["output.log", "simple.tex"]);
}

#[test]
fn intermediate_and_final_follow_flags() {
  let env = TestEnv::new();
  let source = SourceUnit::file(env.write_source("simple.tex", SIMPLE));

  assert!(builder((false, true, false), None, env.out()).build(Some(&source)));
  assert_eq!(entries(env.out()), vec!["output.dvi", "simple.tex"]);

  assert!(builder((false, false, true), None, env.out()).build(Some(&source)));
  assert_eq!(entries(env.out()), vec!["output.pdf", "simple.tex"]);
}

#[test]
fn name_and_directory_are_used() {
  let env = TestEnv::new();
  let source = SourceUnit::file(env.write_source("simple.tex", SIMPLE));
  let dir = env.out().join("newDir");
  std::fs::create_dir(&dir).unwrap();

  assert!(builder((true, true, true), Some("validName"), &dir).build(Some(&source)));

  assert_eq!(
    entries(&dir),
    vec!["validName.dvi", "validName.log", "validName.pdf"]
  );
}

#[test]
fn relative_source_path_is_resolved() {
  let env = TestEnv::new();
  // Relative to the test's working directory, which is the package root.
  let docs = tempfile::TempDir::new_in(".").unwrap();
  std::fs::write(docs.path().join("simple.tex"), format!("{}\n", SIMPLE)).unwrap();
  let relative = docs.path().join("simple.tex");
  assert!(relative.is_relative());

  assert!(builder((false, true, false), None, env.out()).build(Some(&SourceUnit::file(relative))));
  assert!(env.artifact("output", "dvi").exists());
}

#[test]
fn missing_path_fails_but_keeps_transcript() {
  let env = TestEnv::new();
  let builder = builder((true, false, false), None, env.out());

  assert!(!builder.build(Some(&SourceUnit::File(None))));
  assert!(entries(env.out()).is_empty());

  let err = builder
    .run_blocking(&SourceUnit::file(env.out().join("nowhere.tex")))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Compilation);
  assert_eq!(entries(env.out()), vec!["output.log"]);
}

#[test]
fn invalid_file_keeps_transcript_for_diagnosis() {
  let env = TestEnv::new();
  let source = SourceUnit::file(env.write_source("invalid.tex", INVALID));

  let err = builder((true, false, true), None, env.out())
    .run_blocking(&source)
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Compilation);
  assert_eq!(entries(env.out()), vec!["invalid.tex", "output.log"]);
  let log = std::fs::read_to_string(env.artifact("output", "log")).unwrap();
  assert!(log.contains("Undefined control sequence"));
}

#[test]
fn verification_outputs() {
  let env = TestEnv::new();
  let dir = &env.dirs.persistent;
  let simple = SourceUnit::file(env.write_source("simple.tex", SIMPLE));
  let complex = SourceUnit::file(env.write_source("complex.tex", COMPLEX));
  let invalid = SourceUnit::file(env.write_source("invalid.tex", INVALID));

  assert!(builder((false, false, true), Some("buildTexFileTest1"), dir).build(Some(&simple)));
  assert!(builder((false, false, true), Some("buildTexFileTest2"), dir).build(Some(&complex)));
  assert!(!builder((false, false, true), Some("buildTexFileTest3"), dir).build(Some(&invalid)));

  assert_eq!(entries(dir), vec!["buildTexFileTest1.pdf", "buildTexFileTest2.pdf"]);
}
