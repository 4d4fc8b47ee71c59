//! Builds from inline TeX text.

use texbuild_lib::{ErrorKind, SourceUnit};

use super::common::{COMPLEX, INVALID, SIMPLE, TestEnv, builder, entries};

#[test]
fn transcript_kept_only_when_requested() {
  let env = TestEnv::new();
  let log = env.artifact("output", "log");
  let source = SourceUnit::text(SIMPLE);

  assert!(!log.exists());
  assert!(builder((false, false, false), None, env.out()).build(Some(&source)));
  assert!(!log.exists());
  assert!(builder((true, false, false), None, env.out()).build(Some(&source)));
  assert!(log.exists());
  assert_eq!(entries(env.out()), vec!["output.log"]);
}

#[test]
fn intermediate_kept_only_when_requested() {
  let env = TestEnv::new();
  let dvi = env.artifact("output", "dvi");
  let source = SourceUnit::text(SIMPLE);

  assert!(builder((false, false, false), None, env.out()).build(Some(&source)));
  assert!(!dvi.exists());
  assert!(builder((false, true, false), None, env.out()).build(Some(&source)));
  assert!(dvi.exists());
  assert_eq!(entries(env.out()), vec!["output.dvi"]);
}

#[test]
fn final_document_produced_only_when_requested() {
  let env = TestEnv::new();
  let pdf = env.artifact("output", "pdf");
  let source = SourceUnit::text(SIMPLE);

  assert!(builder((false, false, false), None, env.out()).build(Some(&source)));
  assert!(!pdf.exists());
  assert!(builder((false, false, true), None, env.out()).build(Some(&source)));
  assert!(pdf.exists());
  assert_eq!(entries(env.out()), vec!["output.pdf"]);
}

#[test]
fn output_name_is_used() {
  let env = TestEnv::new();

  assert!(builder((true, true, true), Some("validName"), env.out()).build(Some(&SourceUnit::text(SIMPLE))));

  assert_eq!(
    entries(env.out()),
    vec!["validName.dvi", "validName.log", "validName.pdf"]
  );
}

#[test]
fn output_directory_is_used() {
  let env = TestEnv::new();
  let dir = env.out().join("newDir/");
  std::fs::create_dir(&dir).unwrap();

  assert!(builder((true, true, true), None, &dir).build(Some(&SourceUnit::text(SIMPLE))));

  assert_eq!(entries(&dir), vec!["output.dvi", "output.log", "output.pdf"]);
  assert_eq!(entries(env.out()), vec!["newDir"]);
}

#[test]
fn missing_text_fails_without_artifacts() {
  let env = TestEnv::new();
  let builder = builder((true, false, false), None, env.out());

  assert!(!builder.build(Some(&SourceUnit::Text(None))));
  assert!(!builder.build(None));
  assert!(entries(env.out()).is_empty());
}

#[test]
fn invalid_text_fails_without_final_document() {
  let env = TestEnv::new();
  let builder = builder((false, false, true), None, env.out());

  let err = builder.run_blocking(&SourceUnit::text(INVALID)).unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Compilation);
  assert!(entries(env.out()).is_empty());
}

#[test]
fn verification_outputs() {
  let env = TestEnv::new();
  let dir = &env.dirs.persistent;

  assert!(builder((false, false, true), Some("buildTexStringTest1"), dir).build(Some(&SourceUnit::text(SIMPLE))));
  assert!(builder((false, false, true), Some("buildTexStringTest2"), dir).build(Some(&SourceUnit::text(COMPLEX))));
  assert!(!builder((false, false, true), Some("buildTexStringTest3"), dir).build(Some(&SourceUnit::text(INVALID))));

  assert_eq!(
    entries(dir),
    vec!["buildTexStringTest1.pdf", "buildTexStringTest2.pdf"]
  );
}
