//! Connection settings for the hosted model.

use std::time::Duration;

use casedesk_core::vocab::ModelTier;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "http://localhost:3000";
pub const DEFAULT_TITLE: &str = "API Support Bot";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Everything [`crate::OpenRouterClient`] needs to reach the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// OpenAI-compatible API root, without the `/chat/completions` suffix.
  pub base_url:     String,
  /// Bearer token. An empty key is sent as-is and the provider rejects it.
  pub api_key:      String,
  /// Tier used when a request does not name one.
  pub default_tier: ModelTier,
  /// Sent as `HTTP-Referer` for provider-side attribution.
  pub referer:      String,
  /// Sent as `X-Title`.
  pub title:        String,
  pub timeout_secs: u64,
}

impl LlmConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// `true` when no API key is configured.
  pub fn is_unauthenticated(&self) -> bool { self.api_key.trim().is_empty() }
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      base_url:     DEFAULT_BASE_URL.to_owned(),
      api_key:      String::new(),
      default_tier: ModelTier::default(),
      referer:      DEFAULT_REFERER.to_owned(),
      title:        DEFAULT_TITLE.to_owned(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
  }
}
