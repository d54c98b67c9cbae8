/// Generates a log filename from a prefix and an index.
/// Format: <prefix>.<index>, e.g. `app.log.3`
pub fn log_filename(prefix: &str, index: u64) -> String {
  format!("{}.{}", prefix, index)
}

/// Parses the index from a log filename with the given prefix.
///
/// Only canonical decimal numbers are accepted: ASCII digits with no sign
/// and no leading zeros (other than `0` itself). Anything else is not one of
/// our files and yields `None`.
pub fn parse_log_index(prefix: &str, filename: &str) -> Option<u64> {
  let digits = filename.strip_prefix(prefix)?.strip_prefix('.')?;
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  if digits.len() > 1 && digits.starts_with('0') {
    return None;
  }
  digits.parse::<u64>().ok()
}
