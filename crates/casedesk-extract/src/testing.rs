//! A [`ChatBackend`] that replays canned replies, for tests.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use crate::{ChatBackend, CompletionRequest, ExtractError, Result};

/// Answers each request with the next queued reply and records every request.
/// When the queue runs dry it answers [`ExtractError::EmptyReply`].
#[derive(Clone, Default)]
pub struct ScriptedBackend {
  replies:  Arc<Mutex<VecDeque<Result<String>>>>,
  requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedBackend {
  pub fn new() -> Self { Self::default() }

  /// A backend pre-loaded with `replies`, answered in order.
  pub fn with_replies<I, S>(replies: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let backend = Self::new();
    for reply in replies {
      backend.push_reply(reply);
    }
    backend
  }

  pub fn push_reply(&self, reply: impl Into<String>) {
    if let Ok(mut queue) = self.replies.lock() {
      queue.push_back(Ok(reply.into()));
    }
  }

  pub fn push_error(&self, error: ExtractError) {
    if let Ok(mut queue) = self.replies.lock() {
      queue.push_back(Err(error));
    }
  }

  /// Every request received so far, oldest first.
  pub fn requests(&self) -> Vec<CompletionRequest> {
    self.requests.lock().map(|r| r.clone()).unwrap_or_default()
  }
}

impl ChatBackend for ScriptedBackend {
  async fn complete(&self, request: &CompletionRequest) -> Result<String> {
    if let Ok(mut seen) = self.requests.lock() {
      seen.push(request.clone());
    }
    self
      .replies
      .lock()
      .ok()
      .and_then(|mut queue| queue.pop_front())
      .unwrap_or(Err(ExtractError::EmptyReply))
  }
}
