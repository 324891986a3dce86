//! Natural-language extraction for casedesk.
//!
//! Turns free-text support messages into typed case data by asking a hosted
//! chat model (OpenRouter's OpenAI-compatible API) for strictly-shaped JSON and
//! validating the reply against the core vocabularies.
//!
//! The model is reached through the [`ChatBackend`] seam so callers and tests
//! can substitute their own transport.

pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fields;
mod parse;
mod prompts;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{ChatBackend, CompletionRequest, Message, OpenRouterClient, Role};
pub use config::LlmConfig;
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use fields::{AnalyticsSpec, CaseFields, UpdateFields};
