//! The chat assistant: classify a message, extract, act on the store, and
//! render a reply.
//!
//! Every failure, from the model or the store, becomes a `❌` line in the
//! reply text. [`Assistant::respond`] never returns an error.

use std::{fmt::Write as _, sync::Arc};

use casedesk_core::{
  Error as CoreError,
  case::{Case, CaseDetail, CaseId, NewCase, Update},
  store::{AggregateResult, CaseStore},
  vocab::{Intent, ModelTier},
  wire::ChatReply,
};
use casedesk_extract::{AnalyticsSpec, ChatBackend, Extractor};

/// Author recorded on updates made through chat.
pub const CHAT_AUTHOR: &str = "Chat User";

/// How many updates a case card shows.
pub const RECENT_UPDATES: usize = 5;

pub const HELP_TEXT: &str = "❓ I'm not sure what you want to do. Try:
- 'New case for [seller] on [marketplace]'
- 'Update CASE-0001: [description]'
- 'Show case CASE-0001'
- 'How many WIP cases in EU marketplace?'";

pub struct Assistant<S, B> {
  store:     Arc<S>,
  extractor: Extractor<B>,
}

impl<S, B> Clone for Assistant<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      extractor: self.extractor.clone(),
    }
  }
}

impl<S, B> Assistant<S, B>
where
  S: CaseStore,
  B: ChatBackend,
{
  pub fn new(store: Arc<S>, extractor: Extractor<B>) -> Self {
    Self { store, extractor }
  }

  /// Answer one chat message, using `tier` instead of the default model
  /// when given.
  pub async fn respond(&self, message: &str, tier: Option<ModelTier>) -> ChatReply {
    let message = message.trim();
    if message.is_empty() {
      return reply(Intent::Unknown, false, HELP_TEXT.to_owned(), None);
    }

    let extractor = match tier {
      Some(tier) => self.extractor.with_tier(tier),
      None => self.extractor.clone(),
    };

    let intent = match extractor.classify_intent(message).await {
      Ok(intent) => intent,
      Err(e) => {
        tracing::warn!(error = %e, "intent classification failed");
        return reply(
          Intent::Unknown,
          false,
          format!("❌ Could not understand the request: {e}"),
          None,
        );
      }
    };
    tracing::info!(%intent, tier = %extractor.tier(), "chat message");

    match intent {
      Intent::Create => self.create(&extractor, message).await,
      Intent::Update => self.update(&extractor, message).await,
      Intent::Query => self.query(message).await,
      Intent::Analytics => self.analytics(&extractor, message).await,
      Intent::Unknown => reply(Intent::Unknown, true, HELP_TEXT.to_owned(), None),
    }
  }

  async fn create(&self, extractor: &Extractor<B>, message: &str) -> ChatReply {
    let fail = |text: String| reply(Intent::Create, false, text, None);

    let fields = match extractor.extract_case(message).await {
      Ok(fields) => fields,
      Err(e) => return fail(format!("❌ Error extracting information: {e}")),
    };

    let input = NewCase::from(fields);
    if let Err(e) = input.validate() {
      return fail(missing_field_text(&e));
    }

    match self.store.create_case(input).await {
      Ok(case) => {
        let id = case.case_id.clone();
        reply(Intent::Create, true, render_created(&case), Some(id))
      }
      Err(e) => fail(format!("❌ Error creating case: {e}")),
    }
  }

  async fn update(&self, extractor: &Extractor<B>, message: &str) -> ChatReply {
    let fail = |text: String, id: Option<CaseId>| reply(Intent::Update, false, text, id);

    let fields = match extractor.extract_update(message).await {
      Ok(fields) => fields,
      Err(e) => return fail(format!("❌ Error extracting update: {e}"), None),
    };

    let Some(case_id) = fields.case_id.clone().or_else(|| CaseId::find_in(message))
    else {
      return fail(
        "❌ Please specify a valid case ID and update details.".to_owned(),
        None,
      );
    };

    let input = fields.into_case_update(case_id.clone(), CHAT_AUTHOR);
    if let Err(e) = input.validate() {
      return fail(format!("❌ {e}"), Some(case_id));
    }

    match self.store.apply_update(input).await {
      Ok(Some(update)) => {
        reply(Intent::Update, true, render_updated(&update), Some(case_id))
      }
      Ok(None) => fail(format!("❌ Case {case_id} not found"), Some(case_id)),
      Err(e) => fail(format!("❌ Error updating case: {e}"), Some(case_id)),
    }
  }

  async fn query(&self, message: &str) -> ChatReply {
    let Some(case_id) = CaseId::find_in(message) else {
      return reply(
        Intent::Query,
        false,
        "❌ Please specify a case ID (e.g., 'show case CASE-0001')".to_owned(),
        None,
      );
    };

    match self.store.get_case(case_id.clone(), RECENT_UPDATES).await {
      Ok(Some(detail)) => {
        reply(Intent::Query, true, render_case(&detail), Some(case_id))
      }
      Ok(None) => reply(
        Intent::Query,
        false,
        format!("❌ Case {case_id} not found"),
        Some(case_id),
      ),
      Err(e) => reply(
        Intent::Query,
        false,
        format!("❌ Error reading case: {e}"),
        Some(case_id),
      ),
    }
  }

  async fn analytics(&self, extractor: &Extractor<B>, message: &str) -> ChatReply {
    let fail = |text: String| reply(Intent::Analytics, false, text, None);

    let spec = match extractor.extract_analytics(message).await {
      Ok(spec) => spec,
      Err(e) => return fail(format!("❌ Error analyzing query: {e}")),
    };

    match self.store.aggregate(&spec.aggregation()).await {
      Ok(result) => {
        reply(Intent::Analytics, true, render_analytics(&spec, &result), None)
      }
      Err(e) => fail(format!("❌ Error executing analysis: {e}")),
    }
  }
}

fn reply(intent: Intent, ok: bool, text: String, case_id: Option<CaseId>) -> ChatReply {
  ChatReply { intent, ok, text, case_id }
}

fn missing_field_text(e: &CoreError) -> String {
  match e {
    CoreError::MissingField("seller_name") => {
      "❌ I couldn't find a seller name in that message. Please include the \
       seller, e.g. 'New case for Acme Corp on EU'."
        .to_owned()
    }
    CoreError::MissingField("issue_type") => {
      "❌ I couldn't tell what the issue is. Please describe the problem."
        .to_owned()
    }
    other => format!("❌ {other}"),
  }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

fn render_created(case: &Case) -> String {
  format!(
    "✅ **Case Created!**

**Case ID:** {id}
**Seller:** {seller}
**Marketplace:** {marketplace}
**Issue:** {issue}
**Priority:** {priority}
**API:** {api}

You can update this case by referencing: {id}",
    id = case.case_id,
    seller = case.seller_name,
    marketplace = case.marketplace,
    issue = case.issue_type,
    priority = case.priority,
    api = case.api_area,
  )
}

fn render_updated(update: &Update) -> String {
  format!(
    "✅ **Case {} updated successfully**\n\n**Note:** {}\n**Sub-status:** {}",
    update.case_id, update.note, update.sub_status
  )
}

fn or_text(value: Option<impl ToString>, fallback: &str) -> String {
  value.map_or_else(|| fallback.to_owned(), |v| v.to_string())
}

pub fn render_case(detail: &CaseDetail) -> String {
  let case = &detail.case;
  let mut out = format!(
    "📋 **Case {id}**

**Seller:** {seller} (ID: {seller_id})
**Case Reference:** {reference}
**Marketplace:** {marketplace}
**Issue:** {issue}
**Priority:** {priority} | **Status:** {status}
**Sub-status:** {sub_status}
**API:** {api}
**Workstream:** {workstream}
**Specialist:** {specialist}
**Listing Start:** {start}
**Listing Complete:** {complete}
**Feedback:** {feedback}
**CSAT:** {csat}

**Notes:** {notes}",
    id = case.case_id,
    seller = case.seller_name,
    seller_id = case.seller_id,
    reference = or_text(case.case_reference.as_deref(), "Not provided"),
    marketplace = case.marketplace,
    issue = case.issue_type,
    priority = case.priority,
    status = case.case_status,
    sub_status = case.last_sub_status,
    api = case.api_area,
    workstream = case.workstream,
    specialist = case.specialist_name,
    start = or_text(case.listing_start_date, "Not set"),
    complete = or_text(case.listing_completion_date, "Not completed"),
    feedback = if case.feedback_received { "Yes" } else { "No" },
    csat = or_text(case.satisfaction_score, "Not rated"),
    notes = if case.notes.is_empty() { "None" } else { case.notes.as_str() },
  );

  if !detail.recent_updates.is_empty() {
    out.push_str("\n\n**Recent Updates:**");
    for u in &detail.recent_updates {
      let _ = write!(
        out,
        "\n• {}: {} ({})",
        u.timestamp.date_naive(),
        u.note,
        u.sub_status
      );
    }
  }
  out
}

fn render_analytics(spec: &AnalyticsSpec, result: &AggregateResult) -> String {
  let mut out = format!("📊 **{}**\n\n", spec.description);
  if result.group_by.is_some() {
    for g in &result.groups {
      let _ = writeln!(out, "• **{}**: {} cases", g.key, g.count);
    }
    out.push('\n');
  }
  let _ = write!(out, "**Total**: {} cases", result.total);
  out
}
