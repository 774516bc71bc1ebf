//! Error types for `census-enrich`.

use thiserror::Error;

use crate::client::Endpoint;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),

  /// The upstream could not be reached, or answered with a failure status.
  #[error("{0} request failed: {1}")]
  Transport(Endpoint, #[source] reqwest::Error),

  /// The upstream answered, but the body was not the expected JSON shape.
  #[error("{0} returned an unexpected body: {1}")]
  Decode(Endpoint, #[source] reqwest::Error),
}

impl Error {
  /// Which upstream produced this error, if any.
  pub fn endpoint(&self) -> Option<Endpoint> {
    match self {
      Self::Client(_) => None,
      Self::Transport(e, _) | Self::Decode(e, _) => Some(*e),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
