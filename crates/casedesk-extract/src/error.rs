use thiserror::Error;

/// Why an extraction call produced no usable data.
#[derive(Debug, Error)]
pub enum ExtractError {
  /// Network failure, timeout, or an unreadable response body.
  #[error("model request failed: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider answered with a non-success status (bad key, rate limit).
  #[error("model provider returned {status}: {body}")]
  Api { status: u16, body: String },

  #[error("model returned an empty reply")]
  EmptyReply,

  /// The reply did not contain a JSON object of the expected shape.
  #[error("could not read model reply: {0}")]
  Malformed(String),
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
