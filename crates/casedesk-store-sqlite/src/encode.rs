//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision and a
//! `Z` suffix, so lexical order equals chronological order. Calendar dates are
//! `YYYY-MM-DD`. Vocabulary values are stored as their canonical strings.

use casedesk_core::{
  case::{Case, CaseId, Update},
  store::{BreakdownRow, GroupField},
  vocab::{self, Vocabulary},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision [`encode_dt`] keeps, so a record built
/// from it equals the one read back.
pub fn stored_now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

/// Empty strings are treated as "no date"; older rows used them that way.
pub fn decode_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
  match s.map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .map(Some)
      .map_err(|e| Error::DateParse(format!("{s:?}: {e}"))),
  }
}

// ─── Vocabularies ────────────────────────────────────────────────────────────

pub fn decode_vocab<T: Vocabulary>(s: &str) -> Result<T> {
  Ok(vocab::parse::<T>(s)?)
}

/// The `cases` column behind a [`GroupField`].
pub fn group_column(field: GroupField) -> &'static str {
  match field {
    GroupField::CaseStatus => "case_status",
    GroupField::Marketplace => "marketplace",
    GroupField::Workstream => "workstream",
    GroupField::Priority => "priority",
    GroupField::SubStatus => "last_sub_status",
    GroupField::SellerType => "seller_type",
    GroupField::Complexity => "complexity",
    GroupField::CaseSource => "case_source",
    GroupField::ApiArea => "api_area",
    GroupField::IssueType => "issue_type",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawCase::from_row`].
pub const CASE_COLUMNS: &str = "
  case_id, case_reference, seller_id, seller_name, specialist_id,
  specialist_name, marketplace, case_source, case_status, workstream,
  listing_start_date, listing_completion_date, issue_type, complexity,
  priority, api_area, integration_type, seller_type, feedback_received,
  satisfaction_score, notes, last_sub_status, created_at, updated_at";

/// Raw values read directly from a `cases` row.
pub struct RawCase {
  pub case_id:                 String,
  pub case_reference:          Option<String>,
  pub seller_id:               i64,
  pub seller_name:             String,
  pub specialist_id:           String,
  pub specialist_name:         String,
  pub marketplace:             String,
  pub case_source:             String,
  pub case_status:             String,
  pub workstream:              String,
  pub listing_start_date:      Option<String>,
  pub listing_completion_date: Option<String>,
  pub issue_type:              String,
  pub complexity:              String,
  pub priority:                String,
  pub api_area:                String,
  pub integration_type:        String,
  pub seller_type:             String,
  pub feedback_received:       bool,
  pub satisfaction_score:      Option<f64>,
  pub notes:                   String,
  pub last_sub_status:         String,
  pub created_at:              String,
  pub updated_at:              String,
}

impl RawCase {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case_id:                 row.get(0)?,
      case_reference:          row.get(1)?,
      seller_id:               row.get(2)?,
      seller_name:             row.get(3)?,
      specialist_id:           row.get(4)?,
      specialist_name:         row.get(5)?,
      marketplace:             row.get(6)?,
      case_source:             row.get(7)?,
      case_status:             row.get(8)?,
      workstream:              row.get(9)?,
      listing_start_date:      row.get(10)?,
      listing_completion_date: row.get(11)?,
      issue_type:              row.get(12)?,
      complexity:              row.get(13)?,
      priority:                row.get(14)?,
      api_area:                row.get(15)?,
      integration_type:        row.get(16)?,
      seller_type:             row.get(17)?,
      feedback_received:       row.get(18)?,
      satisfaction_score:      row.get(19)?,
      notes:                   row.get(20)?,
      last_sub_status:         row.get(21)?,
      created_at:              row.get(22)?,
      updated_at:              row.get(23)?,
    })
  }

  pub fn into_case(self) -> Result<Case> {
    Ok(Case {
      case_id:                 CaseId::parse(&self.case_id)?,
      case_reference:          self.case_reference.filter(|s| !s.is_empty()),
      seller_id:               self.seller_id,
      seller_name:             self.seller_name,
      specialist_id:           self.specialist_id,
      specialist_name:         self.specialist_name,
      marketplace:             decode_vocab(&self.marketplace)?,
      case_source:             decode_vocab(&self.case_source)?,
      case_status:             decode_vocab(&self.case_status)?,
      workstream:              decode_vocab(&self.workstream)?,
      listing_start_date:      decode_date(self.listing_start_date.as_deref())?,
      listing_completion_date: decode_date(
        self.listing_completion_date.as_deref(),
      )?,
      issue_type:              self.issue_type,
      complexity:              decode_vocab(&self.complexity)?,
      priority:                decode_vocab(&self.priority)?,
      api_area:                self.api_area,
      integration_type:        self.integration_type,
      seller_type:             decode_vocab(&self.seller_type)?,
      feedback_received:       self.feedback_received,
      satisfaction_score:      self.satisfaction_score,
      notes:                   self.notes,
      last_sub_status:         decode_vocab(&self.last_sub_status)?,
      created_at:              decode_dt(&self.created_at)?,
      updated_at:              decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawUpdate::from_row`].
pub const UPDATE_COLUMNS: &str =
  "update_id, case_id, note, author, timestamp, sub_status";

/// Raw values read directly from an `updates` row.
pub struct RawUpdate {
  pub update_id:  i64,
  pub case_id:    String,
  pub note:       String,
  pub author:     String,
  pub timestamp:  String,
  pub sub_status: String,
}

impl RawUpdate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      update_id:  row.get(0)?,
      case_id:    row.get(1)?,
      note:       row.get(2)?,
      author:     row.get(3)?,
      timestamp:  row.get(4)?,
      sub_status: row.get(5)?,
    })
  }

  pub fn into_update(self) -> Result<Update> {
    Ok(Update {
      update_id:  self.update_id,
      case_id:    CaseId::parse(&self.case_id)?,
      note:       self.note,
      author:     self.author,
      timestamp:  decode_dt(&self.timestamp)?,
      sub_status: decode_vocab(&self.sub_status)?,
    })
  }
}

/// Raw values from the breakdown `GROUP BY` query.
pub struct RawBreakdown {
  pub workstream:      String,
  pub marketplace:     String,
  pub issue_type:      String,
  pub api_area:        String,
  pub last_sub_status: String,
  pub count:           i64,
}

impl RawBreakdown {
  pub fn into_row(self) -> Result<BreakdownRow> {
    Ok(BreakdownRow {
      workstream:      decode_vocab(&self.workstream)?,
      marketplace:     decode_vocab(&self.marketplace)?,
      issue_type:      self.issue_type,
      api_area:        self.api_area,
      last_sub_status: decode_vocab(&self.last_sub_status)?,
      count:           self.count.max(0) as u64,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn stored_now_survives_encoding() {
    let now = stored_now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let c = a + chrono::Duration::seconds(1);
    assert!(encode_dt(a) < encode_dt(b));
    assert!(encode_dt(b) < encode_dt(c));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn empty_date_is_none() {
    assert_eq!(decode_date(Some("")).unwrap(), None);
    assert_eq!(decode_date(None).unwrap(), None);
    assert_eq!(
      decode_date(Some("2024-01-15")).unwrap(),
      NaiveDate::from_ymd_opt(2024, 1, 15)
    );
    assert!(decode_date(Some("15/01/2024")).is_err());
  }
}
