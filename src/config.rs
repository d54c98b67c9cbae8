use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::log_dir::LogDir;

/// Mode applied to new log files when no explicit permissions are configured.
pub const DEFAULT_PERMISSIONS: u32 = 0o600;

/// Numeric owner applied to every newly created log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub uid: u32,
  pub gid: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
  /// Where the numbered files live and what they are called.
  pub log_dir: LogDir,

  // --- Rotation ---
  /// Number of files retained, including the active one.
  /// Default: 3.
  pub max_count: usize,

  /// Capacity of a single file in bytes.
  /// Default: 1 MB.
  pub max_size: u64,

  // --- Creation ---
  /// Mode bits for new files. When `None`, files are created `0o600`
  /// (subject to the process umask).
  pub permissions: Option<u32>,

  /// Ownership applied right after a file is created.
  pub owner: Option<Owner>,
}

impl Default for LogOptions {
  fn default() -> Self {
    Self {
      log_dir: LogDir::new(".", "log"),
      max_count: 3,
      max_size: 1024 * 1024, // 1 MB
      permissions: None,
      owner: None,
    }
  }
}

impl LogOptions {
  pub fn new(directory: impl Into<std::path::PathBuf>, prefix: impl Into<String>) -> Self {
    Self {
      log_dir: LogDir::new(directory, prefix),
      ..Default::default()
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.max_count < 1 {
      return Err(Error::Config(format!("max_count must be at least 1, got {}", self.max_count)));
    }
    if self.max_size < 1 {
      return Err(Error::Config(format!("max_size must be at least 1, got {}", self.max_size)));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineLogOptions {
  #[serde(flatten)]
  pub log: LogOptions,

  /// A buffered line is flushed once it reaches this many bytes, even
  /// without a trailing newline. Must not exceed `log.max_size`.
  /// Default: 4 KB.
  pub max_line_size: usize,
}

impl Default for LineLogOptions {
  fn default() -> Self {
    Self {
      log: LogOptions::default(),
      max_line_size: 4096,
    }
  }
}

impl LineLogOptions {
  pub fn new(log: LogOptions, max_line_size: usize) -> Self {
    Self { log, max_line_size }
  }

  pub fn validate(&self) -> Result<()> {
    self.log.validate()?;
    if self.max_line_size < 1 {
      return Err(Error::Config("max_line_size must be at least 1".into()));
    }
    if self.max_line_size as u64 > self.log.max_size {
      return Err(Error::Config(format!(
        "max_line_size ({}) exceeds max_size ({})",
        self.max_line_size, self.log.max_size
      )));
    }
    Ok(())
  }
}
