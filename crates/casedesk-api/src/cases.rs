//! Handlers for `/cases` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cases` | Filters per [`FilterParams`] |
//! | `POST` | `/cases` | Body: [`NewCase`]; 400 if seller or issue missing |
//! | `GET`  | `/cases.csv` | Same filters, as CSV |
//! | `GET`  | `/cases/{id}` | `?recent=N` (default 5); 404 if not found |
//! | `POST` | `/cases/{id}/updates` | Body: [`NewUpdateBody`]; 404 if not found |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use casedesk_core::{
  case::{Case, CaseDetail, CaseId, CaseUpdate, NewCase},
  store::CaseStore,
  wire::NewUpdateBody,
};
use casedesk_extract::ChatBackend;
use serde::Deserialize;

use crate::{AppState, assistant::RECENT_UPDATES, error::ApiError, params::FilterParams};

fn parse_id(raw: &str) -> Result<CaseId, ApiError> { Ok(CaseId::parse(raw)?) }

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /cases[?case_status=..][&marketplace=..]...`
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
  Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Case>>, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let filter = params.to_filter()?;
  let cases = state.store.list_cases(&filter).await.map_err(ApiError::store)?;
  Ok(Json(cases))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /cases`
pub async fn create<S, B>(
  State(state): State<AppState<S, B>>,
  Json(body): Json<NewCase>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  body.validate()?;
  let case = state.store.create_case(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(case)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DetailParams {
  pub recent: Option<usize>,
}

/// `GET /cases/{id}[?recent=N]`
pub async fn get_one<S, B>(
  State(state): State<AppState<S, B>>,
  Path(id): Path<String>,
  Query(params): Query<DetailParams>,
) -> Result<Json<CaseDetail>, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let id = parse_id(&id)?;
  let detail = state
    .store
    .get_case(id.clone(), params.recent.unwrap_or(RECENT_UPDATES))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("case {id} not found")))?;
  Ok(Json(detail))
}

// ─── Updates ─────────────────────────────────────────────────────────────────

/// `POST /cases/{id}/updates`
pub async fn add_update<S, B>(
  State(state): State<AppState<S, B>>,
  Path(id): Path<String>,
  Json(body): Json<NewUpdateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let id = parse_id(&id)?;
  let input = CaseUpdate {
    case_id:                 id.clone(),
    note:                    body.note,
    sub_status:              body.sub_status,
    author:                  body.author,
    listing_completion_date: body.listing_completion_date,
    satisfaction_score:      body.satisfaction_score,
    feedback_received:       body.feedback_received,
  };
  input.validate()?;

  let update = state
    .store
    .apply_update(input)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("case {id} not found")))?;
  Ok((StatusCode::CREATED, Json(update)))
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// `GET /cases.csv`: one row per case, columns in field order.
pub async fn export_csv<S, B>(
  State(state): State<AppState<S, B>>,
  Query(params): Query<FilterParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let filter = params.to_filter()?;
  let cases = state.store.list_cases(&filter).await.map_err(ApiError::store)?;
  let body = cases_csv(&cases)?;
  tracing::debug!(rows = cases.len(), "exported cases");

  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
      (header::CONTENT_DISPOSITION, "attachment; filename=\"cases.csv\""),
    ],
    body,
  ))
}

pub fn cases_csv(cases: &[Case]) -> Result<String, ApiError> {
  let mut writer = csv::Writer::from_writer(vec![]);
  for case in cases {
    writer
      .serialize(case)
      .map_err(|e| ApiError::Export(e.to_string()))?;
  }
  let bytes = writer
    .into_inner()
    .map_err(|e| ApiError::Export(e.to_string()))?;
  String::from_utf8(bytes).map_err(|e| ApiError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
  use casedesk_core::vocab::SubStatus;
  use chrono::Utc;

  use super::*;

  #[test]
  fn csv_has_header_and_one_row_per_case() {
    let mut case = NewCase::new("Acme, Inc.", "Auth").into_case(
      CaseId::from_seq(1),
      12345,
      Utc::now(),
    );
    case.last_sub_status = SubStatus::IntWip;
    let second = NewCase::new("Beta", "Sync").into_case(
      CaseId::from_seq(2),
      67890,
      Utc::now(),
    );

    let csv = cases_csv(&[case, second]).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("case_id,case_reference,seller_id,seller_name"));
    assert!(lines[1].starts_with("CASE-0001,,12345,\"Acme, Inc.\""));
    assert!(lines[1].contains("INT_WIP"));
  }

  #[test]
  fn empty_export_is_empty() {
    assert_eq!(cases_csv(&[]).unwrap(), "");
  }
}
