//! Async HTTP client wrapping the casedesk JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use casedesk_core::{
  case::{Case, CaseDetail, CaseId, NewCase},
  store::BreakdownRow,
  vocab::{CaseStatus, Marketplace, Priority},
  wire::{ChatReply, ChatRequest, DashboardSummary, ErrorBody},
};
use reqwest::{Client, Response};

/// Connection settings for the casedesk API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Filters the Cases tab can apply. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaseQuery {
  pub case_status: Option<CaseStatus>,
  pub marketplace: Option<Marketplace>,
  pub priority:    Option<Priority>,
}

impl CaseQuery {
  fn pairs(&self) -> Vec<(&'static str, &'static str)> {
    let mut pairs = Vec::new();
    if let Some(s) = self.case_status {
      pairs.push(("case_status", s.as_str()));
    }
    if let Some(m) = self.marketplace {
      pairs.push(("marketplace", m.as_str()));
    }
    if let Some(p) = self.priority {
      pairs.push(("priority", p.as_str()));
    }
    pairs
  }
}

/// Async HTTP client for the casedesk JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn check(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = match resp.json::<ErrorBody>().await {
      Ok(body) => body.error,
      Err(_) => status.to_string(),
    };
    Err(anyhow!("{what} → {status}: {message}"))
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  /// `GET /api/cases`
  pub async fn list_cases(&self, query: &CaseQuery) -> Result<Vec<Case>> {
    let resp = self
      .client
      .get(self.url("/cases"))
      .query(&query.pairs())
      .send()
      .await
      .context("GET /cases failed")?;
    Self::check(resp, "GET /cases")
      .await?
      .json()
      .await
      .context("deserialising cases")
  }

  /// `GET /api/cases/{id}?recent=N`
  pub async fn get_case(&self, id: &CaseId, recent: usize) -> Result<CaseDetail> {
    let resp = self
      .client
      .get(self.url(&format!("/cases/{id}")))
      .query(&[("recent", recent)])
      .send()
      .await
      .with_context(|| format!("GET /cases/{id} failed"))?;
    Self::check(resp, "GET /cases/{id}")
      .await?
      .json()
      .await
      .context("deserialising case detail")
  }

  /// `POST /api/cases`
  pub async fn create_case(&self, input: &NewCase) -> Result<Case> {
    let resp = self
      .client
      .post(self.url("/cases"))
      .json(input)
      .send()
      .await
      .context("POST /cases failed")?;
    Self::check(resp, "POST /cases")
      .await?
      .json()
      .await
      .context("deserialising created case")
  }

  /// `GET /api/cases.csv`
  pub async fn export_csv(&self, query: &CaseQuery) -> Result<String> {
    let resp = self
      .client
      .get(self.url("/cases.csv"))
      .query(&query.pairs())
      .send()
      .await
      .context("GET /cases.csv failed")?;
    Self::check(resp, "GET /cases.csv")
      .await?
      .text()
      .await
      .context("reading CSV body")
  }

  // ── Analytics ─────────────────────────────────────────────────────────────

  /// `GET /api/dashboard`
  pub async fn dashboard(&self) -> Result<DashboardSummary> {
    let resp = self
      .client
      .get(self.url("/dashboard"))
      .send()
      .await
      .context("GET /dashboard failed")?;
    Self::check(resp, "GET /dashboard")
      .await?
      .json()
      .await
      .context("deserialising dashboard")
  }

  /// `GET /api/breakdown`
  pub async fn breakdown(&self) -> Result<Vec<BreakdownRow>> {
    let resp = self
      .client
      .get(self.url("/breakdown"))
      .send()
      .await
      .context("GET /breakdown failed")?;
    Self::check(resp, "GET /breakdown")
      .await?
      .json()
      .await
      .context("deserialising breakdown")
  }

  // ── Chat ──────────────────────────────────────────────────────────────────

  /// `POST /api/chat`
  pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
    let resp = self
      .client
      .post(self.url("/chat"))
      .json(request)
      .send()
      .await
      .context("POST /chat failed")?;
    Self::check(resp, "POST /chat")
      .await?
      .json()
      .await
      .context("deserialising chat reply")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_query_sends_no_params() {
    assert!(CaseQuery::default().pairs().is_empty());
  }

  #[test]
  fn query_uses_canonical_strings() {
    let query = CaseQuery {
      case_status: Some(CaseStatus::OnHold),
      marketplace: Some(Marketplace::ThreePx),
      priority:    None,
    };
    assert_eq!(
      query.pairs(),
      vec![("case_status", "ON-HOLD"), ("marketplace", "3PX")]
    );
  }

  #[test]
  fn url_joins_base_and_api_prefix() {
    let client = ApiClient::new(ApiConfig {
      base_url: "http://localhost:8080/".into(),
      timeout:  Duration::from_secs(5),
    })
    .unwrap();
    assert_eq!(client.url("/cases"), "http://localhost:8080/api/cases");
  }
}
