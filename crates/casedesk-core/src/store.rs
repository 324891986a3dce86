//! The `CaseStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `casedesk-store-sqlite`).
//! Higher layers (`casedesk-api`, the chat assistant) depend on this
//! abstraction, not on any concrete backend.

use std::{fmt, future::Future, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  case::{Case, CaseDetail, CaseId, CaseUpdate, NewCase, Update},
  vocab::{
    CaseStatus, Marketplace, Priority, SellerType, SubStatus, Workstream,
  },
};

// ─── Filters ─────────────────────────────────────────────────────────────────

/// An inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Self { Self { from, to } }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.from <= date && date <= self.to
  }
}

/// Case selection shared by listing, aggregation and breakdown queries.
///
/// Each list is a set of accepted values; an empty list places no constraint
/// on that field. All non-empty constraints must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseFilter {
  pub case_statuses:      Vec<CaseStatus>,
  pub marketplaces:       Vec<Marketplace>,
  pub workstreams:        Vec<Workstream>,
  pub priorities:         Vec<Priority>,
  pub sub_statuses:       Vec<SubStatus>,
  pub seller_types:       Vec<SellerType>,
  /// Restrict on `listing_start_date`. Cases without one never match.
  pub listing_start:      Option<DateRange>,
  /// Restrict on the calendar date of `created_at` (UTC).
  pub created:            Option<DateRange>,
}

impl CaseFilter {
  /// `true` if the filter places no constraint at all.
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Evaluate the filter against an in-memory case.
  pub fn matches(&self, case: &Case) -> bool {
    fn accepts<T: PartialEq>(set: &[T], value: &T) -> bool {
      set.is_empty() || set.contains(value)
    }

    accepts(&self.case_statuses, &case.case_status)
      && accepts(&self.marketplaces, &case.marketplace)
      && accepts(&self.workstreams, &case.workstream)
      && accepts(&self.priorities, &case.priority)
      && accepts(&self.sub_statuses, &case.last_sub_status)
      && accepts(&self.seller_types, &case.seller_type)
      && self.listing_start.is_none_or(|range| {
        case.listing_start_date.is_some_and(|d| range.contains(d))
      })
      && self
        .created
        .is_none_or(|range| range.contains(case.created_at.date_naive()))
  }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// A case column that counts can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupField {
  CaseStatus,
  Marketplace,
  Workstream,
  Priority,
  SubStatus,
  SellerType,
  Complexity,
  CaseSource,
  ApiArea,
  IssueType,
}

impl GroupField {
  pub const ALL: &'static [Self] = &[
    Self::CaseStatus,
    Self::Marketplace,
    Self::Workstream,
    Self::Priority,
    Self::SubStatus,
    Self::SellerType,
    Self::Complexity,
    Self::CaseSource,
    Self::ApiArea,
    Self::IssueType,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::CaseStatus => "case_status",
      Self::Marketplace => "marketplace",
      Self::Workstream => "workstream",
      Self::Priority => "priority",
      Self::SubStatus => "sub_status",
      Self::SellerType => "seller_type",
      Self::Complexity => "complexity",
      Self::CaseSource => "case_source",
      Self::ApiArea => "api_area",
      Self::IssueType => "issue_type",
    }
  }
}

impl fmt::Display for GroupField {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for GroupField {
  type Err = Error;

  /// Accepts the canonical names plus the column aliases the model tends to
  /// produce (`status`, `last_sub_status`, `api_supported`).
  fn from_str(s: &str) -> crate::Result<Self> {
    let normalised = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    let field = match normalised.as_str() {
      "status" => Self::CaseStatus,
      "last_sub_status" | "substatus" => Self::SubStatus,
      "api_supported" | "api" => Self::ApiArea,
      "issue" => Self::IssueType,
      other => {
        return Self::ALL
          .iter()
          .copied()
          .find(|f| f.as_str() == other)
          .ok_or_else(|| Error::UnknownValue {
            kind:  "group-by field",
            value: s.to_owned(),
          });
      }
    };
    Ok(field)
  }
}

/// Parameters for [`CaseStore::aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregation {
  pub filter:   CaseFilter,
  pub group_by: Option<GroupField>,
}

/// Count of cases sharing one value of the grouped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
  pub key:   String,
  pub count: u64,
}

/// Result of [`CaseStore::aggregate`]. With no `group_by`, `groups` is empty.
/// With no matching cases, `total` is zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
  pub group_by: Option<GroupField>,
  pub total:    u64,
  /// Ordered by `count` descending, then `key` ascending.
  pub groups:   Vec<GroupCount>,
}

/// One leaf of the workstream → marketplace → issue → API → sub-status tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
  pub workstream:      Workstream,
  pub marketplace:     Marketplace,
  pub issue_type:      String,
  pub api_area:        String,
  pub last_sub_status: SubStatus,
  pub count:           u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a case store backend.
///
/// Updates are append-only; a case row is rewritten only to reflect its
/// newest update. All methods return `Send` futures so the trait can be used
/// in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Assign the next sequential identifier, persist the case with defaults
  /// filled, and record the synthetic "case created" update.
  ///
  /// Fails without writing anything if [`NewCase::validate`] fails.
  fn create_case(
    &self,
    input: NewCase,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  /// Append an update and rewrite the case's sub-status, derived status,
  /// supplied optional fields, and `updated_at`.
  ///
  /// Returns `None`, and writes nothing, if no case has that identifier.
  fn apply_update(
    &self,
    input: CaseUpdate,
  ) -> impl Future<Output = Result<Option<Update>, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a case with its `recent` newest updates (newest first).
  /// Returns `None` if not found.
  fn get_case(
    &self,
    id: CaseId,
    recent: usize,
  ) -> impl Future<Output = Result<Option<CaseDetail>, Self::Error>> + Send + '_;

  /// All cases matching `filter`, most recently updated first.
  fn list_cases<'a>(
    &'a self,
    filter: &'a CaseFilter,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + 'a;

  /// Count matching cases, optionally grouped by one column.
  fn aggregate<'a>(
    &'a self,
    query: &'a Aggregation,
  ) -> impl Future<Output = Result<AggregateResult, Self::Error>> + Send + 'a;

  /// Hierarchical counts for the dashboard tree.
  fn breakdown<'a>(
    &'a self,
    filter: &'a CaseFilter,
  ) -> impl Future<Output = Result<Vec<BreakdownRow>, Self::Error>> + Send + 'a;

  /// Number of updates recorded at or after `since`.
  fn count_updates_since(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
