use parking_lot::Mutex;
use std::fs::{File, OpenOptions, Permissions};
use std::io::{self, Seek, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt, fchown};

use crate::config::{DEFAULT_PERMISSIONS, LogOptions};
use crate::error::{Error, Result};

/// The bounded writer's state: configuration plus at most one open handle,
/// always for index 0.
///
/// `file` is `None` either after `close` or after a rotation failed part way.
/// The two are told apart by `closed`: a detached writer rebuilds its active
/// file on the next write, a closed one refuses everything.
pub(crate) struct LogState {
  options: LogOptions,
  file: Option<File>,
  closed: bool,
}

impl LogState {
  pub(crate) fn open(options: LogOptions) -> Result<Self> {
    options.validate()?;
    let mut state = Self {
      options,
      file: None,
      closed: false,
    };
    state.rotate()?;
    Ok(state)
  }

  pub(crate) fn options(&self) -> &LogOptions {
    &self.options
  }

  pub(crate) fn is_closed(&self) -> bool {
    self.closed
  }

  pub(crate) fn ensure_open(&self) -> Result<()> {
    if self.closed {
      return Err(Error::Closed);
    }
    Ok(())
  }

  /// Bytes left in the active file before it reaches `max_size`.
  /// A file already past the limit, or a missing handle, has no space.
  pub(crate) fn free_space(&mut self) -> io::Result<u64> {
    let Some(file) = self.file.as_mut() else {
      return Ok(0);
    };
    let offset = file.stream_position()?;
    Ok(self.options.max_size.saturating_sub(offset))
  }

  /// Closes the active file, shifts the numbered files and creates a fresh
  /// index 0. On failure the writer is left without a handle.
  pub(crate) fn rotate(&mut self) -> Result<()> {
    self.file = None;
    self.options.log_dir.rotate(self.options.max_count)?;

    let path = self.options.log_dir.file_path(0);
    let mode = self.options.permissions.unwrap_or(DEFAULT_PERMISSIONS);

    // create_new: index 0 was just moved away, so finding it here means
    // someone else is writing to the same directory.
    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create_new(true)
      .mode(mode)
      .open(&path)?;

    if let Some(mode) = self.options.permissions {
      // The mode given to open() is filtered through the umask.
      file.set_permissions(Permissions::from_mode(mode))?;
    }

    if let Some(owner) = self.options.owner {
      fchown(&file, Some(owner.uid), Some(owner.gid))?;
      tracing::trace!(target: "spinlog", "Set owner of {} to {}:{}", path.display(), owner.uid, owner.gid);
    }

    tracing::debug!(target: "spinlog", "Opened new active log file {}", path.display());
    self.file = Some(file);
    Ok(())
  }

  /// Writes `buf` across as many files as it takes, rotating each time the
  /// active file fills up.
  ///
  /// Free space is checked before every chunk. On failure the error carries
  /// the number of bytes that reached a file; the rest of `buf` is dropped.
  pub(crate) fn write(&mut self, buf: &[u8]) -> Result<usize> {
    self.ensure_open()?;

    let mut written = 0;
    let mut remaining = buf;

    if self.file.is_none() && !remaining.is_empty() {
      self.rotate()?;
    }

    while !remaining.is_empty() {
      let space = self.free_space().map_err(|source| Error::Write { written, source })?;
      let take = space.min(remaining.len() as u64) as usize;
      let (chunk, rest) = remaining.split_at(take);

      self
        .write_chunk(chunk, &mut written)
        .map_err(|source| Error::Write { written, source })?;

      remaining = rest;
      if !remaining.is_empty() {
        self.rotate().map_err(|e| e.after(written))?;
      }
    }

    Ok(written)
  }

  fn write_chunk(&mut self, mut chunk: &[u8], written: &mut usize) -> io::Result<()> {
    let Some(file) = self.file.as_mut() else {
      return Err(io::Error::new(io::ErrorKind::NotConnected, "no active log file"));
    };
    while !chunk.is_empty() {
      match file.write(chunk) {
        Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
        Ok(n) => {
          *written += n;
          chunk = &chunk[n..];
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
        Err(e) => return Err(e),
      }
    }
    Ok(())
  }

  pub(crate) fn close(&mut self) -> Result<()> {
    self.ensure_open()?;
    self.closed = true;
    if let Some(file) = self.file.take() {
      // Surfaces deferred write errors that dropping the handle would hide.
      file.sync_data()?;
    }
    Ok(())
  }
}

/// A size-bounded log spread over a fixed number of numbered files.
///
/// Bytes go to `<prefix>.0` until it holds `max_size` bytes, at which point
/// every file is shifted up one index, the oldest beyond `max_count` is
/// deleted, and a fresh `<prefix>.0` is started. A single `write` may span
/// any number of such rotations.
///
/// All operations on one instance are serialized by an internal lock, so a
/// `RotatingLog` can be shared between threads behind an `Arc`. Two instances
/// pointed at the same directory and prefix will corrupt each other.
pub struct RotatingLog {
  inner: Mutex<LogState>,
}

impl RotatingLog {
  /// Validates `options` and creates the first active file, rotating any
  /// files already present.
  pub fn new(options: LogOptions) -> Result<Self> {
    Ok(Self {
      inner: Mutex::new(LogState::open(options)?),
    })
  }

  /// Appends `buf`, rotating as needed. Returns the number of bytes written.
  ///
  /// A failure part way through returns `Error::Write`, whose `written`
  /// field says how many bytes made it to disk before the error.
  pub fn write(&self, buf: &[u8]) -> Result<usize> {
    self.inner.lock().write(buf)
  }

  /// Bytes that still fit in the active file.
  pub fn free_space(&self) -> Result<u64> {
    let mut inner = self.inner.lock();
    inner.ensure_open()?;
    Ok(inner.free_space()?)
  }

  /// Forces a rotation: the active file becomes index 1 and an empty index 0
  /// takes its place.
  pub fn rotate(&self) -> Result<()> {
    let mut inner = self.inner.lock();
    inner.ensure_open()?;
    inner.rotate()
  }

  /// Releases the active file. Closing twice is an error.
  pub fn close(&self) -> Result<()> {
    self.inner.lock().close()
  }

  pub fn is_closed(&self) -> bool {
    self.inner.lock().is_closed()
  }

  pub fn options(&self) -> LogOptions {
    self.inner.lock().options().clone()
  }
}

/// Follows the `io::Write` contract: a failure after some bytes were
/// written reports those bytes as a short write, and the error resurfaces
/// on the next call if it persists.
impl Write for &RotatingLog {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    match RotatingLog::write(*self, buf) {
      Ok(n) => Ok(n),
      Err(e) if e.bytes_written() > 0 => Ok(e.bytes_written()),
      Err(e) => Err(e.into()),
    }
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Write for RotatingLog {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    Write::write(&mut &*self, buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}
