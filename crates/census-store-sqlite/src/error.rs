//! Error type for `census-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// `update_user` was called with no field changes; the caller should have
  /// rejected the request before reaching the store.
  #[error("update with no field changes")]
  EmptyUpdate,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
