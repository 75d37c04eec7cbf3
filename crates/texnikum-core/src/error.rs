//! Error types for `texnikum-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The storage backend failed to persist a collection.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Input rejected before touching storage.
  #[error("invalid input: {0}")]
  InvalidInput(&'static str),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("role {0} is not allowed to perform this action")]
  Forbidden(crate::auth::Role),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
