//! # Spinlog
//!
//! `spinlog` writes an unbounded byte stream into a bounded set of numbered
//! files, deleting the oldest when the set is full. It is meant for long-running
//! processes whose output must never fill the disk.
//!
//! ## Layout
//!
//! With prefix `app`, files are named `app.0`, `app.1`, ... `app.0` is always
//! the file being written; higher numbers are older. When `app.0` reaches
//! `max_size` bytes every file moves up one number, anything at or beyond
//! `max_count` is deleted, and a new `app.0` is created.
//!
//! ## Key Features
//!
//! * **Exact Accounting**: A single write is split across as many files as it
//!   needs, and a failed write reports exactly how many bytes reached disk.
//! * **Whole Lines**: [`LineLog`] buffers until a newline and never splits a
//!   line between two files.
//! * **Thread Safety**: Every call on a log is serialized by one lock.
//! * **Creation Policy**: Optional mode bits and owner for every new file.
//!
//! ## Example
//!
//! ```no_run
//! use spinlog::{LineLog, LineLogOptions, LogOptions, RotatingLog};
//!
//! # fn main() -> spinlog::Result<()> {
//! let mut opts = LogOptions::new("/var/log/myapp", "out");
//! opts.max_count = 5;
//! opts.max_size = 10 * 1024 * 1024;
//!
//! let log = RotatingLog::new(opts.clone())?;
//! log.write(b"raw bytes, split wherever the file fills up")?;
//! log.close()?;
//!
//! let lines = LineLog::new(LineLogOptions::new(opts, 4096))?;
//! lines.write(b"each line lands in exactly one file\n")?;
//! lines.close()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod line;
mod log;
mod log_dir;
mod router;
mod util;

// Re-exports for the flat public API
pub use config::{DEFAULT_PERMISSIONS, LineLogOptions, LogOptions, Owner};
pub use error::{Error, Result};
pub use line::LineLog;
pub use log::RotatingLog;
pub use log_dir::LogDir;
pub use router::{Router, Target};
pub use util::{log_filename, parse_log_index};
