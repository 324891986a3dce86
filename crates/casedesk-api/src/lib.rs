//! JSON REST API and chat assistant for casedesk.
//!
//! Exposes an axum [`Router`] backed by any [`CaseStore`] and any
//! [`ChatBackend`]. Transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", casedesk_api::api_router(state))
//! ```

pub mod analytics;
pub mod assistant;
pub mod cases;
pub mod chat;
pub mod error;
pub mod params;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use casedesk_core::store::CaseStore;
use casedesk_extract::{ChatBackend, Extractor};

pub use assistant::Assistant;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, B> {
  pub store:     Arc<S>,
  pub assistant: Assistant<S, B>,
}

impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      assistant: self.assistant.clone(),
    }
  }
}

impl<S: CaseStore, B: ChatBackend> AppState<S, B> {
  pub fn new(store: Arc<S>, extractor: Extractor<B>) -> Self {
    Self {
      assistant: Assistant::new(Arc::clone(&store), extractor),
      store,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B>(state: AppState<S, B>) -> Router<()>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  Router::new()
    // Cases
    .route("/cases", get(cases::list::<S, B>).post(cases::create::<S, B>))
    .route("/cases.csv", get(cases::export_csv::<S, B>))
    .route("/cases/{id}", get(cases::get_one::<S, B>))
    .route("/cases/{id}/updates", post(cases::add_update::<S, B>))
    // Analytics
    .route("/analytics", get(analytics::aggregate::<S, B>))
    .route("/breakdown", get(analytics::breakdown::<S, B>))
    .route("/dashboard", get(analytics::dashboard::<S, B>))
    // Chat
    .route("/chat", post(chat::handler::<S, B>))
    .route("/vocab", get(chat::vocab))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use casedesk_core::{
    case::{Case, CaseDetail, Update},
    store::AggregateResult,
    vocab::{ModelTier, SubStatus},
    wire::{ChatReply, DashboardSummary, ErrorBody, VocabListing},
  };
  use casedesk_extract::testing::ScriptedBackend;
  use casedesk_store_sqlite::SqliteStore;
  use serde::de::DeserializeOwned;
  use serde_json::json;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_state(replies: &[&str]) -> AppState<SqliteStore, ScriptedBackend> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed_demo_data().await.unwrap();
    let backend = ScriptedBackend::with_replies(replies.iter().copied());
    AppState::new(Arc::new(store), Extractor::new(backend, ModelTier::Balanced))
  }

  async fn send(
    state: AppState<SqliteStore, ScriptedBackend>,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn read<T: DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_filters_by_marketplace() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases?marketplace=EU", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cases: Vec<Case> = read(resp).await;
    assert_eq!(cases.len(), 2);
  }

  #[tokio::test]
  async fn list_rejects_unknown_filter_value() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases?priority=Urgent", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read(resp).await;
    assert!(body.error.contains("Urgent"));
  }

  #[tokio::test]
  async fn create_returns_201_with_next_id() {
    let state = make_state(&[]).await;
    let resp = send(
      state,
      "POST",
      "/cases",
      Some(json!({
        "seller_name": "Acme",
        "issue_type": "Webhook failures",
        "marketplace": "JP",
        "priority": "High"
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let case: Case = read(resp).await;
    assert_eq!(case.case_id.as_str(), "CASE-0004");
    assert_eq!(case.marketplace.as_str(), "JP");
  }

  #[tokio::test]
  async fn create_without_issue_is_400() {
    let state = make_state(&[]).await;
    let resp = send(
      state.clone(),
      "POST",
      "/cases",
      Some(json!({ "seller_name": "Acme" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let cases: Vec<Case> = read(send(state, "GET", "/cases", None).await).await;
    assert_eq!(cases.len(), 3);
  }

  #[tokio::test]
  async fn get_one_honours_recent() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases/case-0001?recent=1", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail: CaseDetail = read(resp).await;
    assert_eq!(detail.recent_updates.len(), 1);
    assert_eq!(detail.recent_updates[0].sub_status, SubStatus::Pma);
  }

  #[tokio::test]
  async fn get_one_missing_is_404() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases/CASE-0099", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn malformed_id_is_400() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases/TICKET-1", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn add_update_moves_status() {
    let state = make_state(&[]).await;
    let resp = send(
      state.clone(),
      "POST",
      "/cases/CASE-0003/updates",
      Some(json!({
        "note": "Paused by seller",
        "sub_status": "ON_HOLD",
        "author": "Alice Johnson"
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let update: Update = read(resp).await;
    assert_eq!(update.sub_status, SubStatus::OnHold);

    let detail: CaseDetail =
      read(send(state, "GET", "/cases/CASE-0003", None).await).await;
    assert_eq!(detail.case.case_status.as_str(), "ON-HOLD");
  }

  #[tokio::test]
  async fn add_update_to_missing_case_is_404() {
    let state = make_state(&[]).await;
    let resp = send(
      state,
      "POST",
      "/cases/CASE-0042/updates",
      Some(json!({ "note": "n", "sub_status": "Note", "author": "me" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn csv_export_sets_content_type() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/cases.csv?marketplace=NA", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers()[header::CONTENT_TYPE],
      "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("Global Retailers Inc"));
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn analytics_groups_by_alias() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/analytics?group_by=status", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let result: AggregateResult = read(resp).await;
    assert_eq!(result.total, 3);
    assert_eq!(result.groups[0].key, "WIP");
    assert_eq!(result.groups[0].count, 2);
  }

  #[tokio::test]
  async fn analytics_unknown_group_is_400() {
    let state = make_state(&[]).await;
    let resp = send(state, "GET", "/analytics?group_by=seller_name", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn breakdown_filters_by_listing_dates() {
    let state = make_state(&[]).await;
    let resp = send(
      state,
      "GET",
      "/breakdown?listing_from=2024-01-11&listing_to=2024-01-31",
      None,
    )
    .await;
    let rows: Vec<casedesk_core::store::BreakdownRow> = read(resp).await;
    let total: u64 = rows.iter().map(|r| r.count).sum();
    assert_eq!(total, 2);
  }

  #[tokio::test]
  async fn dashboard_summarises_seed() {
    let state = make_state(&[]).await;
    let summary: DashboardSummary =
      read(send(state.clone(), "GET", "/dashboard", None).await).await;
    assert_eq!(summary.total_cases, 3);
    assert_eq!(summary.open_cases, 2);
    assert_eq!(summary.most_common_priority.as_deref(), Some("High"));
    assert_eq!(summary.marketplaces_in_use, 2);
    assert_eq!(summary.by_api_area.len(), 3);

    // Seeded history lands a few seconds before now, which may be yesterday
    // just after midnight UTC.
    assert!(summary.updates_today <= 4);
    let hour_ago = chrono::Utc::now() - chrono::Duration::hours(1);
    assert_eq!(state.store.count_updates_since(hour_ago).await.unwrap(), 4);
  }

  // ── Chat & vocab ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn chat_replies_even_when_model_fails() {
    let state = make_state(&[]).await;
    let resp = send(state, "POST", "/chat", Some(json!({ "message": "hello" }))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let reply: ChatReply = read(resp).await;
    assert!(!reply.ok);
  }

  #[tokio::test]
  async fn chat_query_returns_card() {
    let state = make_state(&["query"]).await;
    let resp = send(
      state,
      "POST",
      "/chat",
      Some(json!({ "message": "Show case CASE-0002", "tier": "fast" })),
    )
    .await;
    let reply: ChatReply = read(resp).await;
    assert!(reply.ok);
    assert!(reply.text.contains("Global Retailers Inc"));
    assert!(reply.text.contains("**CSAT:** 4.5"));
  }

  #[tokio::test]
  async fn vocab_lists_every_vocabulary() {
    let state = make_state(&[]).await;
    let listing: VocabListing = read(send(state, "GET", "/vocab", None).await).await;
    assert_eq!(listing, VocabListing::current());
    assert_eq!(listing.sub_statuses.len(), 22);
    assert_eq!(listing.workstreams.len(), 16);
  }
}
