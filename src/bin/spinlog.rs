//! spinlog - copy standard input into rotating log files
//!
//! # Usage
//!
//! ```bash
//! # Keep at most 5 files of 10 MB each under /var/log/app
//! myserver | spinlog --dir /var/log/app --prefix out --count 5 --size 10485760
//!
//! # Never split a line across two files
//! myserver | spinlog --line 4096
//!
//! # Hand the files to another user
//! myserver | spinlog --owner www-data
//! myserver | spinlog --owner 1000:1000 --permissions 640
//! ```

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use nix::unistd::User;
use spinlog::{LineLog, LineLogOptions, LogOptions, Owner, RotatingLog};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// spinlog - copy standard input into size-bounded, rotating log files
#[derive(Parser, Debug)]
#[command(name = "spinlog")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Directory for log files
  #[arg(long, default_value = ".")]
  dir: PathBuf,

  /// Prefix for log files (files are named <prefix>.0, <prefix>.1, ...)
  #[arg(long, default_value = "log")]
  prefix: String,

  /// Max number of log files, including the active one
  #[arg(long, default_value_t = 3)]
  count: usize,

  /// Max log file size in bytes
  #[arg(long, default_value_t = 1_048_576)]
  size: u64,

  /// Octal file permissions for new log files ("-1" or "none" to skip)
  #[arg(long, default_value = "600", allow_hyphen_values = true)]
  permissions: String,

  /// Max line size for buffering; absent or <= 0 means no line buffering
  #[arg(long, value_name = "BYTES", allow_negative_numbers = true)]
  line: Option<i64>,

  /// Owner for new log files, as uid:gid or a user name
  #[arg(long)]
  owner: Option<String>,

  /// JSON file with the full log configuration; replaces the flags above.
  /// Combine with --line to enable line buffering.
  #[arg(long, conflicts_with_all = ["dir", "prefix", "count", "size", "permissions", "owner"])]
  config: Option<PathBuf>,

  /// Log level for spinlog's own diagnostics (trace, debug, info, warn, error)
  #[arg(long, default_value = "warn")]
  log_level: String,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(&cli.log_level)?;

  let (options, line_buffered) = build_options(&cli)?;
  let stdin = io::stdin();

  if line_buffered {
    let log = LineLog::new(options).context("Error opening log")?;
    copy_into(stdin.lock(), &log)?;
    log.close().context("Error closing log")?;
  } else {
    let log = RotatingLog::new(options.log).context("Error opening log")?;
    copy_into(stdin.lock(), &log)?;
    log.close().context("Error closing log")?;
  }
  Ok(())
}

fn copy_into(mut input: impl io::Read, mut output: impl Write) -> Result<()> {
  let copied = io::copy(&mut input, &mut output).context("Error writing log")?;
  tracing::debug!(target: "spinlog", "Copied {} bytes from stdin", copied);
  Ok(())
}

fn init_logging(level: &str) -> Result<()> {
  let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(io::stderr))
    .try_init()?;
  Ok(())
}

/// Builds the log configuration from the command line. The flag reports
/// whether line buffering was requested.
fn build_options(cli: &Cli) -> Result<(LineLogOptions, bool)> {
  if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Error reading {}", path.display()))?;
    let mut options: LineLogOptions =
      serde_json::from_str(&raw).with_context(|| format!("Error parsing {}", path.display()))?;
    let line_size = requested_line_size(cli)?;
    if let Some(size) = line_size {
      options.max_line_size = size;
    }
    return Ok((options, line_size.is_some()));
  }

  let mut log = LogOptions::new(&cli.dir, &cli.prefix);
  log.max_count = cli.count;
  log.max_size = cli.size;
  log.permissions = parse_permissions(&cli.permissions)?;
  log.owner = match &cli.owner {
    Some(owner) => Some(resolve_owner(owner)?),
    None => None,
  };

  let line_size = requested_line_size(cli)?;
  Ok((LineLogOptions::new(log, line_size.unwrap_or(0)), line_size.is_some()))
}

/// The requested line size, or `None` when line buffering is off.
fn requested_line_size(cli: &Cli) -> Result<Option<usize>> {
  match cli.line {
    Some(size) if size > 0 => Ok(Some(usize::try_from(size).context("Line size too large")?)),
    _ => Ok(None),
  }
}

fn parse_permissions(raw: &str) -> Result<Option<u32>> {
  match raw.trim() {
    "-1" | "none" => Ok(None),
    octal => {
      let mode = u32::from_str_radix(octal.trim_start_matches("0o"), 8)
        .map_err(|_| anyhow!("Invalid permissions: {}", raw))?;
      if mode > 0o7777 {
        bail!("Invalid permissions: {}", raw);
      }
      Ok(Some(mode))
    }
  }
}

/// Resolves `uid:gid`, or a user name to that user's uid and primary gid.
fn resolve_owner(raw: &str) -> Result<Owner> {
  if let Some(owner) = parse_numeric_owner(raw) {
    return Ok(owner);
  }
  let user = User::from_name(raw)
    .with_context(|| format!("Invalid owner: {}", raw))?
    .ok_or_else(|| anyhow!("Invalid owner: {}", raw))?;
  Ok(Owner {
    uid: user.uid.as_raw(),
    gid: user.gid.as_raw(),
  })
}

fn parse_numeric_owner(raw: &str) -> Option<Owner> {
  let (uid, gid) = raw.split_once(':')?;
  Some(Owner {
    uid: uid.parse().ok()?,
    gid: gid.parse().ok()?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_numeric_owner() {
    assert_eq!(parse_numeric_owner("1000:100"), Some(Owner { uid: 1000, gid: 100 }));
    assert_eq!(parse_numeric_owner("1000"), None);
    assert_eq!(parse_numeric_owner("a:1"), None);
    assert_eq!(parse_numeric_owner("1:"), None);
  }

  #[test]
  fn test_resolve_root_by_name() {
    let owner = resolve_owner("root").unwrap();
    assert_eq!(owner, Owner { uid: 0, gid: 0 });
  }

  #[test]
  fn test_unknown_owner_fails() {
    assert!(resolve_owner("no-such-user-spinlog-test").is_err());
  }

  #[test]
  fn test_permissions() {
    assert_eq!(parse_permissions("600").unwrap(), Some(0o600));
    assert_eq!(parse_permissions("0644").unwrap(), Some(0o644));
    assert_eq!(parse_permissions("-1").unwrap(), None);
    assert_eq!(parse_permissions("none").unwrap(), None);
    assert!(parse_permissions("999").is_err());
    assert!(parse_permissions("77777").is_err());
  }

  #[test]
  fn test_flags_build_options() {
    let cli = Cli::parse_from([
      "spinlog", "--dir", "/tmp/x", "--prefix", "out", "--count", "4", "--size", "100", "--line", "10", "--owner",
      "5:6",
    ]);
    let (options, line_buffered) = build_options(&cli).unwrap();
    assert!(line_buffered);
    assert_eq!(options.max_line_size, 10);
    assert_eq!(options.log.log_dir.prefix, "out");
    assert_eq!(options.log.max_count, 4);
    assert_eq!(options.log.max_size, 100);
    assert_eq!(options.log.permissions, Some(0o600));
    assert_eq!(options.log.owner, Some(Owner { uid: 5, gid: 6 }));
  }

  #[test]
  fn test_non_positive_line_disables_buffering() {
    for value in ["0", "-1", "-42"] {
      let cli = Cli::try_parse_from(["spinlog", "--line", value]).unwrap();
      let (_, line_buffered) = build_options(&cli).unwrap();
      assert!(!line_buffered, "--line {} should disable buffering", value);
    }
  }

  #[test]
  fn test_config_file_line_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spinlog.json");
    std::fs::write(&path, r#"{ "max_size": 100, "max_line_size": 50 }"#).unwrap();
    let path = path.to_str().unwrap();

    let cli = Cli::try_parse_from(["spinlog", "--config", path, "--line", "0"]).unwrap();
    let (options, line_buffered) = build_options(&cli).unwrap();
    assert!(!line_buffered);
    assert!(options.validate().is_ok());

    let cli = Cli::try_parse_from(["spinlog", "--config", path, "--line", "-1"]).unwrap();
    let (_, line_buffered) = build_options(&cli).unwrap();
    assert!(!line_buffered);

    let cli = Cli::try_parse_from(["spinlog", "--config", path, "--line", "20"]).unwrap();
    let (options, line_buffered) = build_options(&cli).unwrap();
    assert!(line_buffered);
    assert_eq!(options.max_line_size, 20);
    assert!(options.validate().is_ok());

    let cli = Cli::try_parse_from(["spinlog", "--config", path]).unwrap();
    let (options, line_buffered) = build_options(&cli).unwrap();
    assert!(!line_buffered);
    assert_eq!(options.max_line_size, 50);
  }
}
