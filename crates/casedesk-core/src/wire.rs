//! Request and response bodies shared by `casedesk-api` and its clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  case::CaseId,
  store::GroupCount,
  vocab::{
    CaseSource, CaseStatus, Complexity, Intent, Marketplace, ModelTier,
    Priority, SellerType, SubStatus, Vocabulary, Workstream,
  },
};

// ─── Chat ────────────────────────────────────────────────────────────────────

/// `POST /chat` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
  pub message: String,
  /// Model tier for this message; the server default when absent.
  #[serde(default)]
  pub tier:    Option<ModelTier>,
}

/// The assistant's answer to one chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
  pub intent:  Intent,
  /// `false` when the reply reports an error.
  pub ok:      bool,
  /// Markdown-ish text meant to be shown verbatim.
  pub text:    String,
  /// The case created, updated or shown, if any.
  pub case_id: Option<CaseId>,
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// `POST /cases/{id}/updates` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUpdateBody {
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

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// `GET /dashboard` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
  pub total_cases:          u64,
  /// Cases neither completed nor cancelled.
  pub open_cases:           u64,
  pub most_common_priority: Option<String>,
  /// Number of distinct marketplaces with at least one case.
  pub marketplaces_in_use:  u64,
  /// Updates recorded since midnight UTC.
  pub updates_today:        u64,
  pub by_status:            Vec<GroupCount>,
  pub by_marketplace:       Vec<GroupCount>,
  pub by_priority:          Vec<GroupCount>,
  pub by_api_area:          Vec<GroupCount>,
}

// ─── Vocabularies ────────────────────────────────────────────────────────────

/// `GET /vocab` response: every constrained vocabulary, for form pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabListing {
  pub marketplaces:  Vec<String>,
  pub case_sources:  Vec<String>,
  pub case_statuses: Vec<String>,
  pub workstreams:   Vec<String>,
  pub complexities:  Vec<String>,
  pub priorities:    Vec<String>,
  pub seller_types:  Vec<String>,
  pub sub_statuses:  Vec<String>,
  pub model_tiers:   Vec<String>,
}

impl VocabListing {
  pub fn current() -> Self {
    fn strings<T: Vocabulary>() -> Vec<String> {
      T::all().iter().map(|v| v.as_str().to_owned()).collect()
    }

    Self {
      marketplaces:  strings::<Marketplace>(),
      case_sources:  strings::<CaseSource>(),
      case_statuses: strings::<CaseStatus>(),
      workstreams:   strings::<Workstream>(),
      complexities:  strings::<Complexity>(),
      priorities:    strings::<Priority>(),
      seller_types:  strings::<SellerType>(),
      sub_statuses:  strings::<SubStatus>(),
      model_tiers:   strings::<ModelTier>(),
    }
  }
}

/// Body of every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
}
