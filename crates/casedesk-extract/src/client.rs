//! The chat-completion seam and its OpenRouter implementation.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{ExtractError, LlmConfig, Result};

// ─── Request types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub role:    Role,
  pub content: String,
}

impl Message {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

/// One chat-completion call, serialised as the OpenAI-compatible body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
  pub model:       String,
  pub messages:    Vec<Message>,
  pub temperature: f32,
  pub max_tokens:  u32,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Anything that can answer a [`CompletionRequest`] with the assistant's text.
pub trait ChatBackend: Send + Sync {
  /// Returns the content of the first choice. Implementations report an
  /// absent or blank reply as [`ExtractError::EmptyReply`].
  fn complete<'a>(
    &'a self,
    request: &'a CompletionRequest,
  ) -> impl Future<Output = Result<String>> + Send + 'a;
}

// ─── OpenRouter ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CompletionResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

/// [`ChatBackend`] over OpenRouter's `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
  http:   reqwest::Client,
  config: LlmConfig,
}

impl OpenRouterClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
    Ok(Self { http, config })
  }

  pub fn config(&self) -> &LlmConfig { &self.config }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }
}

impl ChatBackend for OpenRouterClient {
  async fn complete(&self, request: &CompletionRequest) -> Result<String> {
    let url = self.endpoint();
    tracing::debug!(
      url = %url,
      model = %request.model,
      max_tokens = request.max_tokens,
      "sending completion request"
    );

    let resp = self
      .http
      .post(&url)
      .bearer_auth(&self.config.api_key)
      .header("HTTP-Referer", &self.config.referer)
      .header("X-Title", &self.config.title)
      .json(request)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(status = status.as_u16(), "model provider rejected request");
      return Err(ExtractError::Api { status: status.as_u16(), body });
    }

    let body: CompletionResponse = resp.json().await?;
    body
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .map(|s| s.trim().to_owned())
      .filter(|s| !s.is_empty())
      .ok_or(ExtractError::EmptyReply)
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, http::HeaderMap, routing::post};
  use serde_json::{Value, json};

  use super::*;

  /// Serve `router` on an ephemeral loopback port; returns its base URL.
  async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
  }

  fn client(base_url: String) -> OpenRouterClient {
    OpenRouterClient::new(LlmConfig {
      base_url,
      api_key: "sk-test".into(),
      ..LlmConfig::default()
    })
    .unwrap()
  }

  fn request() -> CompletionRequest {
    CompletionRequest {
      model:       "openai/gpt-3.5-turbo".into(),
      messages:    vec![Message::system("sys"), Message::user("hello")],
      temperature: 0.1,
      max_tokens:  50,
    }
  }

  #[tokio::test]
  async fn sends_headers_and_reads_first_choice() {
    let router = Router::new().route(
      "/chat/completions",
      post(|headers: HeaderMap, Json(body): Json<Value>| async move {
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(headers["http-referer"], "http://localhost:3000");
        assert_eq!(headers["x-title"], "API Support Bot");
        assert_eq!(body["model"], "openai/gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 50);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        Json(json!({
          "choices": [{ "message": { "role": "assistant", "content": "  create \n" } }]
        }))
      }),
    );
    let base = serve(router).await;

    let reply = client(base).complete(&request()).await.unwrap();
    assert_eq!(reply, "create");
  }

  #[tokio::test]
  async fn non_success_status_is_api_error() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async {
        (axum::http::StatusCode::UNAUTHORIZED, "invalid key")
      }),
    );
    let base = serve(router).await;

    let err = client(base).complete(&request()).await.unwrap_err();
    match err {
      ExtractError::Api { status, body } => {
        assert_eq!(status, 401);
        assert_eq!(body, "invalid key");
      }
      other => panic!("expected Api error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn missing_choices_is_empty_reply() {
    let router = Router::new().route(
      "/chat/completions",
      post(|| async { Json(json!({ "choices": [] })) }),
    );
    let base = serve(router).await;

    let err = client(base).complete(&request()).await.unwrap_err();
    assert!(matches!(err, ExtractError::EmptyReply));
  }

  #[tokio::test]
  async fn unreachable_host_is_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}"))
      .complete(&request())
      .await
      .unwrap_err();
    assert!(matches!(err, ExtractError::Http(_)));
  }
}
