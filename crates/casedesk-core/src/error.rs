//! Error types for `casedesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown {kind} value: {value:?}")]
  UnknownValue { kind: &'static str, value: String },

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("{field} out of range: {value}")]
  OutOfRange { field: &'static str, value: f64 },

  #[error("malformed case id: {0:?}")]
  InvalidCaseId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
