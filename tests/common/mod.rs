#![allow(dead_code)]

use spinlog::{LineLogOptions, LogDir, LogOptions, log_filename};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
  // The TempDir guard must be kept alive to prevent premature deletion of the directory.
  pub _dir: TempDir,
  pub root: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    Self { _dir: dir, root }
  }

  pub fn options(&self, prefix: &str, max_count: usize, max_size: u64) -> LogOptions {
    let mut opts = LogOptions::new(&self.root, prefix);
    opts.max_count = max_count;
    opts.max_size = max_size;
    opts
  }

  pub fn line_options(&self, prefix: &str, max_count: usize, max_size: u64, max_line_size: usize) -> LineLogOptions {
    LineLogOptions::new(self.options(prefix, max_count, max_size), max_line_size)
  }

  pub fn log_dir(&self, prefix: &str) -> LogDir {
    LogDir::new(&self.root, prefix)
  }

  pub fn path(&self, prefix: &str, index: u64) -> PathBuf {
    self.root.join(log_filename(prefix, index))
  }

  pub fn read(&self, prefix: &str, index: u64) -> Option<Vec<u8>> {
    fs::read(self.path(prefix, index)).ok()
  }

  pub fn touch(&self, prefix: &str, index: u64, content: &[u8]) {
    fs::write(self.path(prefix, index), content).unwrap();
  }

  /// Asserts the files under `prefix` hold exactly `expected`, newest first,
  /// and that no other index exists.
  pub fn assert_files(&self, prefix: &str, expected: &[&str]) {
    for (i, content) in expected.iter().enumerate() {
      let actual = self
        .read(prefix, i as u64)
        .unwrap_or_else(|| panic!("Missing file {}", log_filename(prefix, i as u64)));
      assert_eq!(
        String::from_utf8_lossy(&actual),
        *content,
        "Unexpected content for file {}",
        i
      );
    }
    let ids = self.log_dir(prefix).list().unwrap();
    let expected_ids: Vec<u64> = (0..expected.len() as u64).collect();
    assert_eq!(ids, expected_ids, "Unexpected set of files for prefix {}", prefix);
  }
}
