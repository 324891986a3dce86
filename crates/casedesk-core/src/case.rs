//! Case and update types: the two records the store persists.
//!
//! A case is one support issue for one seller. Every change to a case's
//! workflow position is recorded as an [`Update`]; updates are insert-only and
//! the case's `last_sub_status` / `case_status` always reflect the newest one.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  vocab::{
    CaseSource, CaseStatus, Complexity, Marketplace, Priority, SellerType,
    SubStatus, Workstream,
  },
};

// ─── Defaults ────────────────────────────────────────────────────────────────

pub const DEFAULT_SELLER_NAME: &str = "Unknown Seller";
pub const DEFAULT_SPECIALIST_ID: &str = "SPEC001";
pub const DEFAULT_SPECIALIST_NAME: &str = "Demo Specialist";
pub const DEFAULT_API_AREA: &str = "General API";
pub const DEFAULT_INTEGRATION_TYPE: &str = "REST API";

/// Note and author of the synthetic update written when a case is created.
pub const CREATED_NOTE: &str = "Case created from interface";
pub const SYSTEM_AUTHOR: &str = "System";

/// Inclusive bounds of the satisfaction (CSAT) score.
pub const SATISFACTION_RANGE: std::ops::RangeInclusive<f64> = 1.0..=5.0;

// ─── CaseId ──────────────────────────────────────────────────────────────────

/// Human-readable sequential case identifier, e.g. `CASE-0004`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CaseId(String);

impl CaseId {
  const PREFIX: &'static str = "CASE-";

  /// The identifier for the `n`th case (1-based).
  pub fn from_seq(n: u64) -> Self { Self(format!("{}{n:04}", Self::PREFIX)) }

  /// Parse `CASE-<digits>`, case-insensitively. Surrounding whitespace is
  /// ignored.
  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    let upper = trimmed.to_ascii_uppercase();
    match upper.strip_prefix(Self::PREFIX) {
      Some(digits)
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
      {
        Ok(Self(upper))
      }
      _ => Err(Error::InvalidCaseId(raw.to_owned())),
    }
  }

  /// Find the first case identifier mentioned in free text.
  pub fn find_in(text: &str) -> Option<Self> {
    text
      .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '(' | ')'))
      .map(|word| word.trim_end_matches(|c: char| !c.is_ascii_alphanumeric()))
      .find_map(|word| Self::parse(word).ok())
  }

  /// The numeric part of the identifier.
  pub fn seq(&self) -> u64 {
    self
      .0
      .get(Self::PREFIX.len()..)
      .and_then(|digits| digits.parse().ok())
      .unwrap_or(0)
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl std::str::FromStr for CaseId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for CaseId {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::parse(&raw) }
}

impl From<CaseId> for String {
  fn from(id: CaseId) -> Self { id.0 }
}

// ─── Case ────────────────────────────────────────────────────────────────────

/// A persisted support case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
  pub case_id:                 CaseId,
  /// External reference on the marketplace side, e.g. `AMZ-12345678`.
  pub case_reference:          Option<String>,
  pub seller_id:               i64,
  pub seller_name:             String,
  pub specialist_id:           String,
  pub specialist_name:         String,
  pub marketplace:             Marketplace,
  pub case_source:             CaseSource,
  /// Always `last_sub_status.case_status()`.
  pub case_status:             CaseStatus,
  pub workstream:              Workstream,
  pub listing_start_date:      Option<NaiveDate>,
  pub listing_completion_date: Option<NaiveDate>,
  pub issue_type:              String,
  pub complexity:              Complexity,
  pub priority:                Priority,
  /// Which API the issue concerns, e.g. "Orders API".
  pub api_area:                String,
  pub integration_type:        String,
  pub seller_type:             SellerType,
  pub feedback_received:       bool,
  pub satisfaction_score:      Option<f64>,
  pub notes:                   String,
  pub last_sub_status:         SubStatus,
  pub created_at:              DateTime<Utc>,
  pub updated_at:              DateTime<Utc>,
}

// ─── NewCase ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CaseStore::create_case`].
///
/// Every field is optional; [`NewCase::into_case`] fills the documented
/// defaults. Seller name and issue type are nevertheless required and are
/// checked by [`NewCase::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewCase {
  pub case_reference:          Option<String>,
  pub seller_id:               Option<i64>,
  pub seller_name:             Option<String>,
  pub specialist_id:           Option<String>,
  pub specialist_name:         Option<String>,
  pub marketplace:             Option<Marketplace>,
  pub case_source:             Option<CaseSource>,
  pub workstream:              Option<Workstream>,
  pub listing_start_date:      Option<NaiveDate>,
  pub listing_completion_date: Option<NaiveDate>,
  pub issue_type:              Option<String>,
  pub complexity:              Option<Complexity>,
  pub priority:                Option<Priority>,
  pub api_area:                Option<String>,
  pub integration_type:        Option<String>,
  pub seller_type:             Option<SellerType>,
  pub feedback_received:       Option<bool>,
  pub satisfaction_score:      Option<f64>,
  pub notes:                   Option<String>,
}

impl NewCase {
  /// Convenience constructor with only the two required fields set.
  pub fn new(seller_name: impl Into<String>, issue_type: impl Into<String>) -> Self {
    Self {
      seller_name: Some(seller_name.into()),
      issue_type: Some(issue_type.into()),
      ..Self::default()
    }
  }

  /// Check required fields and bounded values.
  pub fn validate(&self) -> Result<()> {
    if is_blank(&self.seller_name) {
      return Err(Error::MissingField("seller_name"));
    }
    if is_blank(&self.issue_type) {
      return Err(Error::MissingField("issue_type"));
    }
    check_satisfaction(self.satisfaction_score)
  }

  /// Build the full record for a freshly created case. Assumes
  /// [`NewCase::validate`] has passed.
  ///
  /// `fallback_seller_id` is used when the input has no seller id; `now`
  /// stamps both timestamps and is the default listing start date.
  pub fn into_case(
    self,
    case_id: CaseId,
    fallback_seller_id: i64,
    now: DateTime<Utc>,
  ) -> Case {
    let sub_status = SubStatus::CaseCreated;
    Case {
      case_id,
      case_reference: non_blank(self.case_reference),
      seller_id: self.seller_id.unwrap_or(fallback_seller_id),
      seller_name: non_blank(self.seller_name)
        .unwrap_or_else(|| DEFAULT_SELLER_NAME.to_owned()),
      specialist_id: non_blank(self.specialist_id)
        .unwrap_or_else(|| DEFAULT_SPECIALIST_ID.to_owned()),
      specialist_name: non_blank(self.specialist_name)
        .unwrap_or_else(|| DEFAULT_SPECIALIST_NAME.to_owned()),
      marketplace: self.marketplace.unwrap_or_default(),
      case_source: self.case_source.unwrap_or_default(),
      case_status: sub_status.case_status(),
      workstream: self.workstream.unwrap_or_default(),
      listing_start_date: Some(
        self.listing_start_date.unwrap_or_else(|| now.date_naive()),
      ),
      listing_completion_date: self.listing_completion_date,
      issue_type: non_blank(self.issue_type).unwrap_or_default(),
      complexity: self.complexity.unwrap_or_default(),
      priority: self.priority.unwrap_or_default(),
      api_area: non_blank(self.api_area)
        .unwrap_or_else(|| DEFAULT_API_AREA.to_owned()),
      integration_type: non_blank(self.integration_type)
        .unwrap_or_else(|| DEFAULT_INTEGRATION_TYPE.to_owned()),
      seller_type: self.seller_type.unwrap_or_default(),
      feedback_received: self.feedback_received.unwrap_or(false),
      satisfaction_score: self.satisfaction_score,
      notes: self.notes.unwrap_or_default().trim().to_owned(),
      last_sub_status: sub_status,
      created_at: now,
      updated_at: now,
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// One status-change event on a case. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
  /// Store-assigned, strictly increasing.
  pub update_id:  i64,
  pub case_id:    CaseId,
  pub note:       String,
  pub author:     String,
  pub timestamp:  DateTime<Utc>,
  pub sub_status: SubStatus,
}

/// Input to [`crate::store::CaseStore::apply_update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseUpdate {
  pub case_id:                 CaseId,
  pub note:                    String,
  pub sub_status:              SubStatus,
  pub author:                  String,
  #[serde(default)]
  pub listing_completion_date: Option<NaiveDate>,
  #[serde(default)]
  pub satisfaction_score:      Option<f64>,
  #[serde(default)]
  pub feedback_received:       Option<bool>,
}

impl CaseUpdate {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    case_id: CaseId,
    note: impl Into<String>,
    sub_status: SubStatus,
    author: impl Into<String>,
  ) -> Self {
    Self {
      case_id,
      note: note.into(),
      sub_status,
      author: author.into(),
      listing_completion_date: None,
      satisfaction_score: None,
      feedback_received: None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    check_satisfaction(self.satisfaction_score)
  }
}

// ─── CaseDetail ──────────────────────────────────────────────────────────────

/// A case bundled with its most recent updates, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDetail {
  pub case:           Case,
  pub recent_updates: Vec<Update>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn is_blank(value: &Option<String>) -> bool {
  value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

fn check_satisfaction(score: Option<f64>) -> Result<()> {
  match score {
    Some(v) if !SATISFACTION_RANGE.contains(&v) => Err(Error::OutOfRange {
      field: "satisfaction_score",
      value: v,
    }),
    _ => Ok(()),
  }
}
