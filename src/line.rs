use parking_lot::Mutex;
use std::io::{self, Write};

use crate::config::LineLogOptions;
use crate::error::Result;
use crate::log::LogState;

struct LineState {
  log: LogState,
  max_line_size: usize,
  line: Vec<u8>,
}

impl LineState {
  fn write(&mut self, buf: &[u8]) -> Result<usize> {
    self.log.ensure_open()?;
    for (i, &byte) in buf.iter().enumerate() {
      self.line.push(byte);
      if self.line.len() >= self.max_line_size || byte == b'\n' {
        self.flush_line().map_err(|e| e.after(i))?;
      }
    }
    Ok(buf.len())
  }

  /// Writes the buffered line to the log and empties the buffer, whether or
  /// not the write succeeded.
  fn flush_line(&mut self) -> Result<()> {
    let result = Self::write_whole(&mut self.log, &self.line);
    self.line.clear();
    result
  }

  /// Writes `line` so that it lands in a single file, rotating first if the
  /// active file cannot hold all of it.
  fn write_whole(log: &mut LogState, line: &[u8]) -> Result<()> {
    if line.len() as u64 > log.free_space()? {
      log.rotate()?;
    }
    log.write(line)?;
    Ok(())
  }

  fn close(&mut self) -> Result<()> {
    self.log.ensure_open()?;
    let flushed = if self.line.is_empty() { Ok(()) } else { self.flush_line() };
    // A close failure wins over a flush failure; a clean close keeps it.
    self.log.close()?;
    flushed
  }
}

/// A [`RotatingLog`](crate::RotatingLog) that only ever writes whole lines.
///
/// Bytes are buffered until a newline arrives or the buffer reaches
/// `max_line_size`, and each buffered line is written to exactly one file:
/// if the active file cannot hold it, the log rotates first and the tail of
/// the old file is left unused.
///
/// Any partial line still buffered is written by [`LineLog::close`], or on
/// drop if the log was never closed.
pub struct LineLog {
  inner: Mutex<LineState>,
}

impl LineLog {
  pub fn new(options: LineLogOptions) -> Result<Self> {
    options.validate()?;
    let log = LogState::open(options.log)?;
    Ok(Self {
      inner: Mutex::new(LineState {
        log,
        max_line_size: options.max_line_size,
        line: Vec::with_capacity(options.max_line_size),
      }),
    })
  }

  /// Buffers `buf`, flushing a line at every newline and every time the
  /// buffer reaches `max_line_size` bytes.
  ///
  /// If a flush fails the error is `Error::Write` with `written` set to the
  /// number of input bytes consumed before the byte that triggered it. The
  /// line that failed to flush is discarded.
  pub fn write(&self, buf: &[u8]) -> Result<usize> {
    self.inner.lock().write(buf)
  }

  /// Flushes any partial line and closes the underlying log.
  pub fn close(&self) -> Result<()> {
    self.inner.lock().close()
  }

  pub fn is_closed(&self) -> bool {
    self.inner.lock().log.is_closed()
  }

  /// Number of bytes waiting for a newline.
  pub fn buffered_len(&self) -> usize {
    self.inner.lock().line.len()
  }

  pub fn options(&self) -> LineLogOptions {
    let inner = self.inner.lock();
    LineLogOptions::new(inner.log.options().clone(), inner.max_line_size)
  }
}

impl Drop for LineLog {
  fn drop(&mut self) {
    let inner = self.inner.get_mut();
    if inner.log.is_closed() {
      return;
    }
    if let Err(e) = inner.close() {
      tracing::error!(target: "spinlog", "Failed to close line log on drop. Buffered data may be lost. Error: {}", e);
    }
  }
}

/// `flush` does not write out a partial line; only closing does.
impl Write for &LineLog {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    match LineLog::write(*self, buf) {
      Ok(n) => Ok(n),
      Err(e) if e.bytes_written() > 0 => Ok(e.bytes_written()),
      Err(e) => Err(e.into()),
    }
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Write for LineLog {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    Write::write(&mut &*self, buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}
