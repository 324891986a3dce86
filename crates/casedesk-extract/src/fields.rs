//! Typed results of extraction, and the raw reply shapes they are read from.

use casedesk_core::{
  case::{CaseId, CaseUpdate, NewCase},
  store::{Aggregation, CaseFilter, GroupField},
  vocab::{
    CaseSource, Complexity, Marketplace, Priority, SellerType, SubStatus,
    Workstream,
  },
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::parse::{
  date_value, loose_bool, loose_list, loose_number, loose_string, present,
  vocab_value, vocab_values,
};

/// Note recorded when the model found no description of the change.
pub const DEFAULT_UPDATE_NOTE: &str = "Update from chat";

/// Sub-status recorded when the model gave none or an unknown one.
pub const DEFAULT_UPDATE_SUB_STATUS: SubStatus = SubStatus::Note;

// ─── Case ────────────────────────────────────────────────────────────────────

/// Case attributes read from a free-text description. Absent or unknown
/// values are `None`; the store fills defaults on creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFields {
  pub seller_name:        Option<String>,
  pub case_reference:     Option<String>,
  pub marketplace:        Option<Marketplace>,
  pub case_source:        Option<CaseSource>,
  pub workstream:         Option<Workstream>,
  pub issue_type:         Option<String>,
  pub complexity:         Option<Complexity>,
  pub priority:           Option<Priority>,
  pub seller_type:        Option<SellerType>,
  pub api_area:           Option<String>,
  pub listing_start_date: Option<NaiveDate>,
  pub notes:              Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CaseReply {
  #[serde(deserialize_with = "loose_string")]
  seller_name:        Option<String>,
  #[serde(alias = "amazon_case_id", deserialize_with = "loose_string")]
  case_reference:     Option<String>,
  #[serde(deserialize_with = "loose_string")]
  marketplace:        Option<String>,
  #[serde(deserialize_with = "loose_string")]
  case_source:        Option<String>,
  #[serde(deserialize_with = "loose_string")]
  workstream:         Option<String>,
  #[serde(deserialize_with = "loose_string")]
  issue_type:         Option<String>,
  #[serde(deserialize_with = "loose_string")]
  complexity:         Option<String>,
  #[serde(deserialize_with = "loose_string")]
  priority:           Option<String>,
  #[serde(deserialize_with = "loose_string")]
  seller_type:        Option<String>,
  #[serde(alias = "api_supported", deserialize_with = "loose_string")]
  api_area:           Option<String>,
  #[serde(deserialize_with = "loose_string")]
  listing_start_date: Option<String>,
  #[serde(deserialize_with = "loose_string")]
  notes:              Option<String>,
}

impl From<CaseReply> for CaseFields {
  fn from(r: CaseReply) -> Self {
    Self {
      seller_name:        present(r.seller_name),
      case_reference:     present(r.case_reference),
      marketplace:        vocab_value(r.marketplace),
      case_source:        vocab_value(r.case_source),
      workstream:         vocab_value(r.workstream),
      issue_type:         present(r.issue_type),
      complexity:         vocab_value(r.complexity),
      priority:           vocab_value(r.priority),
      seller_type:        vocab_value(r.seller_type),
      api_area:           present(r.api_area),
      listing_start_date: date_value("listing_start_date", r.listing_start_date),
      notes:              present(r.notes),
    }
  }
}

impl From<CaseFields> for NewCase {
  fn from(f: CaseFields) -> Self {
    NewCase {
      case_reference: f.case_reference,
      seller_name: f.seller_name,
      marketplace: f.marketplace,
      case_source: f.case_source,
      workstream: f.workstream,
      listing_start_date: f.listing_start_date,
      issue_type: f.issue_type,
      complexity: f.complexity,
      priority: f.priority,
      api_area: f.api_area,
      seller_type: f.seller_type,
      notes: f.notes,
      ..NewCase::default()
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// A status change read from free text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
  pub case_id:                 Option<CaseId>,
  pub note:                    Option<String>,
  pub sub_status:              Option<SubStatus>,
  pub listing_completion_date: Option<NaiveDate>,
  pub satisfaction_score:      Option<f64>,
  pub feedback_received:       Option<bool>,
}

impl UpdateFields {
  /// Build the store input, filling the chat defaults for note and
  /// sub-status.
  pub fn into_case_update(self, case_id: CaseId, author: &str) -> CaseUpdate {
    CaseUpdate {
      case_id,
      note: self.note.unwrap_or_else(|| DEFAULT_UPDATE_NOTE.to_owned()),
      sub_status: self.sub_status.unwrap_or(DEFAULT_UPDATE_SUB_STATUS),
      author: author.to_owned(),
      listing_completion_date: self.listing_completion_date,
      satisfaction_score: self.satisfaction_score,
      feedback_received: self.feedback_received,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UpdateReply {
  #[serde(deserialize_with = "loose_string")]
  case_id:                 Option<String>,
  #[serde(deserialize_with = "loose_string")]
  note:                    Option<String>,
  #[serde(deserialize_with = "loose_string")]
  sub_status:              Option<String>,
  #[serde(deserialize_with = "loose_string")]
  listing_completion_date: Option<String>,
  #[serde(alias = "satisfaction_score", deserialize_with = "loose_number")]
  csat_score:              Option<f64>,
  #[serde(deserialize_with = "loose_bool")]
  feedback_received:       Option<bool>,
}

impl From<UpdateReply> for UpdateFields {
  fn from(r: UpdateReply) -> Self {
    let case_id = present(r.case_id).and_then(|raw| match CaseId::parse(&raw) {
      Ok(id) => Some(id),
      Err(_) => CaseId::find_in(&raw),
    });
    Self {
      case_id,
      note: present(r.note),
      sub_status: vocab_value(r.sub_status),
      listing_completion_date: date_value(
        "listing_completion_date",
        r.listing_completion_date,
      ),
      satisfaction_score: r.csat_score,
      feedback_received: r.feedback_received,
    }
  }
}

// ─── Analytics ───────────────────────────────────────────────────────────────

/// A counting question translated into a filter and optional grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsSpec {
  pub filter:      CaseFilter,
  pub group_by:    Option<GroupField>,
  /// The model's own phrasing of the question, used as a heading.
  pub description: String,
}

impl AnalyticsSpec {
  pub const DEFAULT_DESCRIPTION: &str = "Case analysis";

  pub fn aggregation(&self) -> Aggregation {
    Aggregation {
      filter:   self.filter.clone(),
      group_by: self.group_by,
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AnalyticsReply {
  filters:     Option<AnalyticsFilters>,
  #[serde(deserialize_with = "loose_string")]
  group_by:    Option<String>,
  #[serde(deserialize_with = "loose_string")]
  description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnalyticsFilters {
  #[serde(alias = "status", deserialize_with = "loose_list")]
  case_status: Option<Vec<String>>,
  #[serde(deserialize_with = "loose_list")]
  marketplace: Option<Vec<String>>,
  #[serde(deserialize_with = "loose_list")]
  workstream:  Option<Vec<String>>,
  #[serde(deserialize_with = "loose_list")]
  priority:    Option<Vec<String>>,
  #[serde(alias = "last_sub_status", deserialize_with = "loose_list")]
  sub_status:  Option<Vec<String>>,
  #[serde(deserialize_with = "loose_list")]
  seller_type: Option<Vec<String>>,
}

impl From<AnalyticsReply> for AnalyticsSpec {
  fn from(r: AnalyticsReply) -> Self {
    let group_by = present(r.group_by).and_then(|raw| match raw.parse() {
      Ok(field) => Some(field),
      Err(_) => {
        tracing::warn!(value = %raw, "model returned unknown group-by field");
        None
      }
    });
    let f = r.filters.unwrap_or_default();
    Self {
      filter: CaseFilter {
        case_statuses: vocab_values(f.case_status),
        marketplaces: vocab_values(f.marketplace),
        workstreams: vocab_values(f.workstream),
        priorities: vocab_values(f.priority),
        sub_statuses: vocab_values(f.sub_status),
        seller_types: vocab_values(f.seller_type),
        ..CaseFilter::default()
      },
      group_by,
      description: present(r.description)
        .unwrap_or_else(|| Self::DEFAULT_DESCRIPTION.to_owned()),
    }
  }
}
