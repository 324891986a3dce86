//! [`SqliteStore`]: the SQLite implementation of [`CaseStore`].

use std::path::Path;

use casedesk_core::{
  case::{
    CREATED_NOTE, Case, CaseDetail, CaseId, CaseUpdate, NewCase, SYSTEM_AUTHOR,
    Update,
  },
  store::{AggregateResult, Aggregation, BreakdownRow, CaseFilter, CaseStore, GroupCount},
  vocab::SubStatus,
};
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{
    CASE_COLUMNS, RawBreakdown, RawCase, RawUpdate, UPDATE_COLUMNS, encode_date,
    encode_dt, group_column, stored_now,
  },
  filter::WhereClause,
  schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A case store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every
/// operation runs on the connection's single background thread, so
/// identifier assignment inside a transaction cannot race within a process.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    let from = self
      .conn
      .call(|conn| Ok(schema::migrate(conn)?))
      .await?;
    if from < schema::CURRENT_VERSION {
      tracing::info!(
        from,
        to = schema::CURRENT_VERSION,
        "migrated case store schema"
      );
    }
    Ok(())
  }
}

// ─── Row writers ─────────────────────────────────────────────────────────────

/// Insert a fully-built [`Case`] into the `cases` table.
pub(crate) fn insert_case(
  conn: &rusqlite::Connection,
  case: &Case,
) -> rusqlite::Result<()> {
  conn.execute(
    &format!(
      "INSERT INTO cases ({CASE_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
               ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)"
    ),
    rusqlite::params![
      case.case_id.as_str(),
      case.case_reference,
      case.seller_id,
      case.seller_name,
      case.specialist_id,
      case.specialist_name,
      case.marketplace.as_str(),
      case.case_source.as_str(),
      case.case_status.as_str(),
      case.workstream.as_str(),
      case.listing_start_date.map(encode_date),
      case.listing_completion_date.map(encode_date),
      case.issue_type,
      case.complexity.as_str(),
      case.priority.as_str(),
      case.api_area,
      case.integration_type,
      case.seller_type.as_str(),
      case.feedback_received,
      case.satisfaction_score,
      case.notes,
      case.last_sub_status.as_str(),
      encode_dt(case.created_at),
      encode_dt(case.updated_at),
    ],
  )?;
  Ok(())
}

/// Append one row to `updates`; returns the assigned `update_id`.
pub(crate) fn insert_update(
  conn: &rusqlite::Connection,
  case_id: &CaseId,
  note: &str,
  author: &str,
  timestamp: DateTime<Utc>,
  sub_status: SubStatus,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO updates (case_id, note, author, timestamp, sub_status)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      case_id.as_str(),
      note,
      author,
      encode_dt(timestamp),
      sub_status.as_str(),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Seller ids are not supplied by the chat path; draw a five-digit one.
fn random_seller_id() -> i64 { 10_000 + i64::from(OsRng.next_u32() % 90_000) }

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn create_case(&self, input: NewCase) -> Result<Case> {
    input.validate()?;

    let fallback_seller_id = random_seller_id();
    let now = stored_now();

    let case = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let count: i64 =
          tx.query_row("SELECT COUNT(*) FROM cases", [], |r| r.get(0))?;
        let case_id = CaseId::from_seq(count.max(0) as u64 + 1);
        let case = input.into_case(case_id, fallback_seller_id, now);

        insert_case(&tx, &case)?;
        insert_update(
          &tx,
          &case.case_id,
          CREATED_NOTE,
          SYSTEM_AUTHOR,
          now,
          SubStatus::CaseCreated,
        )?;
        tx.commit()?;
        Ok(case)
      })
      .await?;

    tracing::info!(
      case_id = %case.case_id,
      seller = %case.seller_name,
      marketplace = %case.marketplace,
      "case created"
    );
    Ok(case)
  }

  async fn apply_update(&self, input: CaseUpdate) -> Result<Option<Update>> {
    input.validate()?;

    let now = stored_now();
    let status = input.sub_status.case_status();

    let update = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM cases WHERE case_id = ?1",
            rusqlite::params![input.case_id.as_str()],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        if !exists {
          return Ok(None);
        }

        let update_id = insert_update(
          &tx,
          &input.case_id,
          &input.note,
          &input.author,
          now,
          input.sub_status,
        )?;

        tx.execute(
          "UPDATE cases SET
             last_sub_status         = ?1,
             case_status             = ?2,
             updated_at              = ?3,
             listing_completion_date = COALESCE(?4, listing_completion_date),
             satisfaction_score      = COALESCE(?5, satisfaction_score),
             feedback_received       = COALESCE(?6, feedback_received)
           WHERE case_id = ?7",
          rusqlite::params![
            input.sub_status.as_str(),
            status.as_str(),
            encode_dt(now),
            input.listing_completion_date.map(encode_date),
            input.satisfaction_score,
            input.feedback_received,
            input.case_id.as_str(),
          ],
        )?;
        tx.commit()?;

        Ok(Some(Update {
          update_id,
          case_id: input.case_id,
          note: input.note,
          author: input.author,
          timestamp: now,
          sub_status: input.sub_status,
        }))
      })
      .await?;

    match &update {
      Some(u) => tracing::info!(
        case_id = %u.case_id,
        sub_status = %u.sub_status,
        status = %status,
        "case updated"
      ),
      None => tracing::debug!("update for unknown case ignored"),
    }
    Ok(update)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_case(
    &self,
    id: CaseId,
    recent: usize,
  ) -> Result<Option<CaseDetail>> {
    let limit = i64::try_from(recent).unwrap_or(i64::MAX);

    let raw: Option<(RawCase, Vec<RawUpdate>)> = self
      .conn
      .call(move |conn| {
        let case = conn
          .query_row(
            &format!("SELECT {CASE_COLUMNS} FROM cases WHERE case_id = ?1"),
            rusqlite::params![id.as_str()],
            RawCase::from_row,
          )
          .optional()?;

        let Some(case) = case else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT {UPDATE_COLUMNS} FROM updates
           WHERE case_id = ?1
           ORDER BY timestamp DESC, update_id DESC
           LIMIT ?2"
        ))?;
        let updates = stmt
          .query_map(rusqlite::params![id.as_str(), limit], RawUpdate::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((case, updates)))
      })
      .await?;

    let Some((case, updates)) = raw else {
      return Ok(None);
    };

    Ok(Some(CaseDetail {
      case:           case.into_case()?,
      recent_updates: updates
        .into_iter()
        .map(RawUpdate::into_update)
        .collect::<Result<_>>()?,
    }))
  }

  async fn list_cases(&self, filter: &CaseFilter) -> Result<Vec<Case>> {
    let clause = WhereClause::build(filter);

    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CASE_COLUMNS} FROM cases
           {}
           ORDER BY updated_at DESC, case_id DESC",
          clause.sql
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(clause.params),
            RawCase::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  async fn aggregate(&self, query: &Aggregation) -> Result<AggregateResult> {
    let clause = WhereClause::build(&query.filter);
    let group_by = query.group_by;

    let groups: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let sql = match group_by {
          Some(field) => {
            let column = group_column(field);
            format!(
              "SELECT {column}, COUNT(*) AS n FROM cases
               {}
               GROUP BY {column}
               ORDER BY n DESC, {column} ASC",
              clause.sql
            )
          }
          None => format!(
            "SELECT 'total', COUNT(*) FROM cases {}",
            clause.sql
          ),
        };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(clause.params), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let result = match group_by {
      Some(_) => {
        let groups: Vec<GroupCount> = groups
          .into_iter()
          .map(|(key, n)| GroupCount { key, count: n.max(0) as u64 })
          .collect();
        AggregateResult {
          group_by,
          total: groups.iter().map(|g| g.count).sum(),
          groups,
        }
      }
      None => AggregateResult {
        group_by,
        total: groups.first().map_or(0, |(_, n)| (*n).max(0) as u64),
        groups: vec![],
      },
    };

    tracing::debug!(
      group_by = ?result.group_by,
      total = result.total,
      groups = result.groups.len(),
      "aggregate"
    );
    Ok(result)
  }

  async fn breakdown(&self, filter: &CaseFilter) -> Result<Vec<BreakdownRow>> {
    let clause = WhereClause::build(filter);

    let raws: Vec<RawBreakdown> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT workstream, marketplace, issue_type, api_area,
                  last_sub_status, COUNT(*)
           FROM cases
           {}
           GROUP BY workstream, marketplace, issue_type, api_area, last_sub_status
           ORDER BY workstream, marketplace, issue_type, api_area, last_sub_status",
          clause.sql
        ))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(clause.params), |row| {
            Ok(RawBreakdown {
              workstream:      row.get(0)?,
              marketplace:     row.get(1)?,
              issue_type:      row.get(2)?,
              api_area:        row.get(3)?,
              last_sub_status: row.get(4)?,
              count:           row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBreakdown::into_row).collect()
  }

  async fn count_updates_since(&self, since: DateTime<Utc>) -> Result<u64> {
    let since_str = encode_dt(since);

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM updates WHERE timestamp >= ?1",
          rusqlite::params![since_str],
          |r| r.get(0),
        )?)
      })
      .await?;

    Ok(n.max(0) as u64)
  }
}
