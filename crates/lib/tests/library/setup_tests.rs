//! The test directory preparation itself.

use tempfile::TempDir;

use super::common::TestSetup;

#[test]
fn setup_clears_existing_directories() {
  let root = TempDir::new().unwrap();
  std::fs::create_dir_all(root.path().join("temp")).unwrap();
  std::fs::write(root.path().join("temp").join("leftover.log"), "old").unwrap();

  let dirs = TestSetup::new(root.path()).setup().unwrap();

  assert!(dirs.temporary.is_dir());
  assert!(dirs.persistent.is_dir());
  assert!(std::fs::read_dir(&dirs.temporary).unwrap().next().is_none());
}

#[test]
fn setup_runs_once() {
  let root = TempDir::new().unwrap();
  let mut setup = TestSetup::new(root.path());

  let first = setup.setup().unwrap();
  std::fs::write(first.persistent.join("keep.pdf"), "pdf").unwrap();
  let second = setup.setup().unwrap();

  assert_eq!(first.persistent, second.persistent);
  assert!(second.persistent.join("keep.pdf").exists());
}
