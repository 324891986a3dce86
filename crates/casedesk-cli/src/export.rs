//! Writing CSV exports fetched from the server to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// `cases_YYYYMMDD_HHMMSS.csv` inside `dir`.
pub fn export_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
  dir.join(format!("cases_{}.csv", at.format("%Y%m%d_%H%M%S")))
}

/// Write `body` to a fresh timestamped file in `dir` and return its path.
pub fn write_export(dir: &Path, body: &str) -> Result<PathBuf> {
  std::fs::create_dir_all(dir)
    .with_context(|| format!("creating export directory {}", dir.display()))?;
  let path = export_path(dir, Local::now());
  std::fs::write(&path, body)
    .with_context(|| format!("writing {}", path.display()))?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn path_is_timestamped() {
    let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    assert_eq!(
      export_path(Path::new("/tmp/out"), at),
      PathBuf::from("/tmp/out/cases_20240309_140507.csv")
    );
  }

  #[test]
  fn writes_body_to_disk() {
    let dir = std::env::temp_dir().join(format!("casedesk-export-{}", std::process::id()));
    let path = write_export(&dir, "case_id\nCASE-0001\n").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "case_id\nCASE-0001\n");
    std::fs::remove_dir_all(&dir).ok();
  }
}
