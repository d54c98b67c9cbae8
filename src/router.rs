use parking_lot::Mutex;
use std::io::{self, Write};

pub type Target = Box<dyn Write + Send>;

/// A writer whose destination can be swapped while it is in use.
///
/// Handy for pointing a long-lived output (for example a process' log sink)
/// at a new [`RotatingLog`](crate::RotatingLog) without handing out a new
/// writer. With no target installed, writes succeed and the bytes are dropped.
#[derive(Default)]
pub struct Router {
  target: Mutex<Option<Target>>,
}

impl Router {
  pub fn new() -> Self {
    Self::default()
  }

  /// Installs `target`, returning the one it replaces.
  pub fn set_target(&self, target: impl Write + Send + 'static) -> Option<Target> {
    self.target.lock().replace(Box::new(target))
  }

  /// Removes and returns the current target.
  pub fn take_target(&self) -> Option<Target> {
    self.target.lock().take()
  }

  pub fn has_target(&self) -> bool {
    self.target.lock().is_some()
  }
}

impl Write for &Router {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    match self.target.lock().as_mut() {
      Some(target) => target.write(buf),
      None => Ok(buf.len()),
    }
  }

  fn flush(&mut self) -> io::Result<()> {
    match self.target.lock().as_mut() {
      Some(target) => target.flush(),
      None => Ok(()),
    }
  }
}

impl Write for Router {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    Write::write(&mut &*self, buf)
  }

  fn flush(&mut self) -> io::Result<()> {
    Write::flush(&mut &*self)
  }
}
