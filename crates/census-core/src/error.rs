//! Error types for `census-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The named field is not in the updatable-attribute allow-list.
  #[error("unknown user field: {0:?}")]
  UnknownField(String),

  #[error("field {field} expects {expected}")]
  InvalidFieldValue {
    field:    &'static str,
    expected: &'static str,
  },

  #[error("{0} must not be empty")]
  EmptyName(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
