use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O Error: {0}")]
  Io(#[from] io::Error),

  /// A write failed part way through. `written` is the number of input bytes
  /// the call accounts for before the failure.
  #[error("Write failed after {written} bytes: {source}")]
  Write {
    written: usize,
    #[source]
    source: io::Error,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Log is closed")]
  Closed,
}

impl Error {
  /// Number of input bytes accounted for by a failed `write`.
  /// Always zero for errors that did not come from a write.
  pub fn bytes_written(&self) -> usize {
    match self {
      Error::Write { written, .. } => *written,
      _ => 0,
    }
  }

  /// Re-labels an error with a new byte count, keeping the underlying cause.
  pub(crate) fn after(self, written: usize) -> Self {
    match self {
      Error::Io(source) | Error::Write { source, .. } => Error::Write { written, source },
      other => other,
    }
  }
}

impl From<Error> for io::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Io(e) | Error::Write { source: e, .. } => e,
      Error::Config(msg) => io::Error::new(io::ErrorKind::InvalidInput, msg),
      Error::Closed => io::Error::new(io::ErrorKind::BrokenPipe, Error::Closed),
    }
  }
}
