//! [`Extractor`]: one model call per operation, validated into core types.

use std::sync::Arc;

use casedesk_core::vocab::{Intent, ModelTier};

use crate::{
  ChatBackend, CompletionRequest, Message, Result,
  fields::{AnalyticsReply, AnalyticsSpec, CaseFields, CaseReply, UpdateFields, UpdateReply},
  parse::parse_reply,
  prompts,
};

/// Keywords searched for in the intent reply, in priority order.
const INTENT_KEYWORDS: &[(&str, Intent)] = &[
  ("create", Intent::Create),
  ("update", Intent::Update),
  ("analytics", Intent::Analytics),
  ("query", Intent::Query),
];

/// Extraction bound to a backend and a model tier.
///
/// Cloning shares the backend.
pub struct Extractor<B> {
  backend: Arc<B>,
  tier:    ModelTier,
}

impl<B> Clone for Extractor<B> {
  fn clone(&self) -> Self {
    Self { backend: Arc::clone(&self.backend), tier: self.tier }
  }
}

impl<B: ChatBackend> Extractor<B> {
  pub fn new(backend: B, tier: ModelTier) -> Self {
    Self::from_arc(Arc::new(backend), tier)
  }

  pub fn from_arc(backend: Arc<B>, tier: ModelTier) -> Self {
    Self { backend, tier }
  }

  /// The same backend, talking to another model.
  pub fn with_tier(&self, tier: ModelTier) -> Self {
    Self { backend: Arc::clone(&self.backend), tier }
  }

  pub fn tier(&self) -> ModelTier { self.tier }

  pub fn backend(&self) -> &B { &self.backend }

  async fn ask(
    &self,
    system: Option<&str>,
    prompt: String,
    max_tokens: u32,
  ) -> Result<String> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
      messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));

    let request = CompletionRequest {
      model: self.tier.model_id().to_owned(),
      messages,
      temperature: prompts::TEMPERATURE,
      max_tokens,
    };
    self.backend.complete(&request).await
  }

  /// Classify a chat message. A reply naming none of the intents is
  /// [`Intent::Unknown`].
  pub async fn classify_intent(&self, text: &str) -> Result<Intent> {
    let reply = self
      .ask(None, prompts::intent(text), prompts::INTENT_MAX_TOKENS)
      .await?
      .to_lowercase();

    let intent = INTENT_KEYWORDS
      .iter()
      .find(|(keyword, _)| reply.contains(keyword))
      .map_or(Intent::Unknown, |(_, intent)| *intent);

    tracing::debug!(%intent, tier = %self.tier, "classified message");
    Ok(intent)
  }

  pub async fn extract_case(&self, text: &str) -> Result<CaseFields> {
    let reply = self
      .ask(
        Some(prompts::CASE_SYSTEM),
        prompts::case(text),
        prompts::CASE_MAX_TOKENS,
      )
      .await?;
    Ok(parse_reply::<CaseReply>(&reply)?.into())
  }

  pub async fn extract_update(&self, text: &str) -> Result<UpdateFields> {
    let reply = self
      .ask(
        Some(prompts::UPDATE_SYSTEM),
        prompts::update(text),
        prompts::UPDATE_MAX_TOKENS,
      )
      .await?;
    Ok(parse_reply::<UpdateReply>(&reply)?.into())
  }

  pub async fn extract_analytics(&self, text: &str) -> Result<AnalyticsSpec> {
    let reply = self
      .ask(
        Some(prompts::ANALYTICS_SYSTEM),
        prompts::analytics(text),
        prompts::ANALYTICS_MAX_TOKENS,
      )
      .await?;
    Ok(parse_reply::<AnalyticsReply>(&reply)?.into())
  }
}
