//! Handlers for `/analytics`, `/breakdown` and `/dashboard`.

use axum::{
  Json,
  extract::{Query, State},
};
use casedesk_core::{
  store::{AggregateResult, Aggregation, BreakdownRow, CaseFilter, CaseStore, GroupField},
  vocab::CaseStatus,
  wire::DashboardSummary,
};
use casedesk_extract::ChatBackend;
use chrono::Utc;
use serde::Deserialize;

use crate::{AppState, error::ApiError, params::FilterParams};

// ─── Analytics ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
  #[serde(flatten)]
  pub filter:   FilterParams,
  pub group_by: Option<String>,
}

/// `GET /analytics[?group_by=marketplace][&<filters>]`
pub async fn aggregate<S, B>(
  State(state): State<AppState<S, B>>,
  Query(params): Query<AnalyticsParams>,
) -> Result<Json<AggregateResult>, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let group_by = params
    .group_by
    .as_deref()
    .filter(|s| !s.trim().is_empty())
    .map(str::parse::<GroupField>)
    .transpose()?;
  let query = Aggregation {
    filter: params.filter.to_filter()?,
    group_by,
  };
  let result = state.store.aggregate(&query).await.map_err(ApiError::store)?;
  Ok(Json(result))
}

// ─── Breakdown ───────────────────────────────────────────────────────────────

/// `GET /breakdown[?listing_from=..&listing_to=..][&created_from=..&created_to=..]`
pub async fn breakdown<S, B>(
  State(state): State<AppState<S, B>>,
  Query(params): Query<FilterParams>,
) -> Result<Json<Vec<BreakdownRow>>, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let filter = params.to_filter()?;
  let rows = state.store.breakdown(&filter).await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// `GET /dashboard`
pub async fn dashboard<S, B>(
  State(state): State<AppState<S, B>>,
) -> Result<Json<DashboardSummary>, ApiError>
where
  S: CaseStore + 'static,
  B: ChatBackend + 'static,
{
  let summary = summarise(state.store.as_ref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summary))
}

/// Headline metrics and chart series over every case.
pub async fn summarise<S: CaseStore>(store: &S) -> Result<DashboardSummary, S::Error> {
  let by = |field| Aggregation {
    filter:   CaseFilter::default(),
    group_by: Some(field),
  };

  let by_status = store.aggregate(&by(GroupField::CaseStatus)).await?;
  let by_marketplace = store.aggregate(&by(GroupField::Marketplace)).await?;
  let by_priority = store.aggregate(&by(GroupField::Priority)).await?;
  let by_api_area = store.aggregate(&by(GroupField::ApiArea)).await?;

  let midnight = Utc::now()
    .date_naive()
    .and_hms_opt(0, 0, 0)
    .map(|dt| dt.and_utc())
    .unwrap_or_else(Utc::now);
  let updates_today = store.count_updates_since(midnight).await?;

  let closed = [CaseStatus::Completed.as_str(), CaseStatus::Cancelled.as_str()];
  let open_cases = by_status
    .groups
    .iter()
    .filter(|g| !closed.contains(&g.key.as_str()))
    .map(|g| g.count)
    .sum();

  Ok(DashboardSummary {
    total_cases: by_status.total,
    open_cases,
    most_common_priority: by_priority.groups.first().map(|g| g.key.clone()),
    marketplaces_in_use: by_marketplace.groups.len() as u64,
    updates_today,
    by_status: by_status.groups,
    by_marketplace: by_marketplace.groups,
    by_priority: by_priority.groups,
    by_api_area: by_api_area.groups,
  })
}
