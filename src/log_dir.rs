use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::util::{log_filename, parse_log_index};

/// A directory of numbered log files sharing a prefix.
///
/// With prefix `foo`, the files are `foo.0`, `foo.1`, ... where `foo.0` is
/// the newest and larger indices are strictly older. The struct holds no state
/// of its own; every call looks at the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDir {
  pub directory: PathBuf,
  pub prefix: String,
}

impl Default for LogDir {
  fn default() -> Self {
    Self::new(".", "log")
  }
}

impl LogDir {
  pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
    Self {
      directory: directory.into(),
      prefix: prefix.into(),
    }
  }

  /// Returns the indices of all log files in the directory, ascending.
  ///
  /// With prefix `foo` and entries `["foo.0", "foo.24", "foobar", "foo.3"]`
  /// this returns `[0, 3, 24]`. Names that do not parse are skipped. Any
  /// failure while reading the directory fails the whole call.
  pub fn list(&self) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for entry in fs::read_dir(&self.directory)? {
      let entry = entry?;
      let name = entry.file_name();
      let Some(name) = name.to_str() else {
        continue;
      };
      if let Some(id) = parse_log_index(&self.prefix, name) {
        ids.push(id);
      }
    }
    ids.sort_unstable();
    Ok(ids)
  }

  /// Shifts every log file up by one index, leaving index 0 free.
  ///
  /// `max_count` is the number of files allowed to exist afterwards once a
  /// new index 0 is created, so any file whose shifted index would reach
  /// `max_count` is deleted instead. With `max_count = 3` and files
  /// `foo.0..=foo.4`, this deletes `foo.2`, `foo.3`, `foo.4` and renames
  /// `foo.1 -> foo.2`, `foo.0 -> foo.1`.
  ///
  /// Files are processed from the highest index down so a rename never lands
  /// on a file that has not moved yet. The first failing remove or rename
  /// aborts the call; nothing already done is rolled back, and a later call
  /// carries on from whatever `list` then observes.
  pub fn rotate(&self, max_count: usize) -> Result<()> {
    let ids = self.list()?;
    for &id in ids.iter().rev() {
      let path = self.file_path(id);
      if id.saturating_add(1) >= max_count as u64 {
        tracing::trace!(target: "spinlog", "Evicting {}", path.display());
        fs::remove_file(&path)?;
      } else {
        fs::rename(&path, self.file_path(id + 1))?;
      }
    }
    Ok(())
  }

  /// Path of the log file with the given index.
  pub fn file_path(&self, index: u64) -> PathBuf {
    self.directory.join(log_filename(&self.prefix, index))
  }
}
