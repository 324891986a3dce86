//! SQL schema and migrations for the casedesk SQLite store.
//!
//! Migrations are additive and gated on `PRAGMA user_version`: migration `i`
//! (0-based) brings the database to version `i + 1`. Existing rows survive
//! every upgrade.

use rusqlite::Connection;

/// Connection-level settings applied on every open.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// Version 1: the initial column set.
const V1: &str = "
CREATE TABLE IF NOT EXISTS cases (
    case_id                 TEXT PRIMARY KEY,       -- CASE-0001
    seller_id               INTEGER NOT NULL,
    seller_name             TEXT NOT NULL,
    specialist_id           TEXT NOT NULL,
    specialist_name         TEXT NOT NULL,
    marketplace             TEXT NOT NULL,
    case_source             TEXT NOT NULL,
    case_status             TEXT NOT NULL,          -- derived from last_sub_status
    workstream              TEXT NOT NULL,
    listing_start_date      TEXT,                   -- YYYY-MM-DD
    listing_completion_date TEXT,                   -- YYYY-MM-DD
    issue_type              TEXT NOT NULL,
    complexity              TEXT NOT NULL,
    priority                TEXT NOT NULL,
    api_area                TEXT NOT NULL,
    integration_type        TEXT NOT NULL,
    seller_type             TEXT NOT NULL,
    notes                   TEXT NOT NULL DEFAULT '',
    last_sub_status         TEXT NOT NULL
);

-- Updates are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS updates (
    update_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id    TEXT NOT NULL REFERENCES cases(case_id),
    note       TEXT NOT NULL,
    author     TEXT NOT NULL,
    timestamp  TEXT NOT NULL,                       -- RFC 3339 UTC, micros
    sub_status TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS updates_case_idx      ON updates(case_id);
CREATE INDEX IF NOT EXISTS updates_timestamp_idx ON updates(timestamp);
CREATE INDEX IF NOT EXISTS cases_status_idx      ON cases(case_status);
";

/// Version 2: external reference, feedback, satisfaction and timestamps.
const V2: &str = "
ALTER TABLE cases ADD COLUMN case_reference     TEXT;
ALTER TABLE cases ADD COLUMN feedback_received  INTEGER NOT NULL DEFAULT 0;
ALTER TABLE cases ADD COLUMN satisfaction_score REAL;
ALTER TABLE cases ADD COLUMN created_at         TEXT NOT NULL DEFAULT '1970-01-01T00:00:00.000000Z';
ALTER TABLE cases ADD COLUMN updated_at         TEXT NOT NULL DEFAULT '1970-01-01T00:00:00.000000Z';

CREATE INDEX IF NOT EXISTS cases_updated_idx ON cases(updated_at);
";

/// Every migration, in order.
pub const MIGRATIONS: &[&str] = &[V1, V2];

/// The version a fully migrated database reports.
pub const CURRENT_VERSION: u32 = MIGRATIONS.len() as u32;

/// Bring `conn` up to [`CURRENT_VERSION`]; returns the version it started at.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
  conn.execute_batch(PRAGMAS)?;

  let start: u32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
  for (index, sql) in MIGRATIONS.iter().enumerate().skip(start as usize) {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.execute_batch(&format!("PRAGMA user_version = {}", index + 1))?;
    tx.commit()?;
  }
  Ok(start)
}

/// Apply only the first `version` migrations. Used to fabricate old
/// databases in tests.
#[cfg(test)]
pub fn migrate_to(conn: &mut Connection, version: u32) -> rusqlite::Result<()> {
  conn.execute_batch(PRAGMAS)?;
  for (index, sql) in MIGRATIONS.iter().enumerate().take(version as usize) {
    conn.execute_batch(sql)?;
    conn.execute_batch(&format!("PRAGMA user_version = {}", index + 1))?;
  }
  Ok(())
}
