//! Handlers for `/chat` and `/vocab`.

use axum::{Json, extract::State};
use casedesk_core::{
  store::CaseStore,
  wire::{ChatReply, ChatRequest, VocabListing},
};
use casedesk_extract::ChatBackend;

use crate::AppState;

/// `POST /chat` with body `{"message": "...", "tier": "smart"}`.
///
/// Always 200; failures are reported in the reply text with `ok: false`.
pub async fn handler<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<ChatRequest>,
) -> Json<ChatReply>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  Json(state.assistant.respond(&body.message, body.tier).await)
}

/// `GET /vocab`
pub async fn vocab() -> Json<VocabListing> { Json(VocabListing::current()) }
