//! The `UserStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `census-store-sqlite`).
//! The HTTP layer (`census-api`) depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::user::{CandidateUser, FieldChange, UserRecord};

// ─── Listing options ─────────────────────────────────────────────────────────

/// Rows returned by a listing when the caller does not say otherwise.
pub const DEFAULT_LIMIT: u32 = 3;

/// Query-string token selecting ascending age order.
pub const SORT_AGE_ASCENDING: &str = "age.a";
/// Query-string token selecting descending age order.
pub const SORT_AGE_DESCENDING: &str = "age.d";

/// Ordering applied by [`UserStore::list_users`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  /// Insertion order (`created_at`).
  #[default]
  CreatedAt,
  AgeAscending,
  AgeDescending,
}

impl SortOrder {
  /// Unrecognised or absent tokens fall back to insertion order.
  pub fn parse(token: Option<&str>) -> Self {
    match token {
      Some(SORT_AGE_ASCENDING) => Self::AgeAscending,
      Some(SORT_AGE_DESCENDING) => Self::AgeDescending,
      _ => Self::CreatedAt,
    }
  }
}

/// Parameters for [`UserStore::list_users`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
  pub order: SortOrder,
  pub limit: u32,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self { order: SortOrder::default(), limit: DEFAULT_LIMIT }
  }
}

impl ListQuery {
  /// Build from raw query-string values. Both parameters are lenient: an
  /// unknown sort token means default order, a missing or non-numeric limit
  /// means [`DEFAULT_LIMIT`].
  pub fn from_raw(sort: Option<&str>, limit: Option<&str>) -> Self {
    Self {
      order: SortOrder::parse(sort),
      limit: limit
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_LIMIT),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a census user store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait UserStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a candidate record. The store assigns `id` and `created_at`
  /// and returns the full stored record.
  fn create_user(
    &self,
    candidate: CandidateUser,
  ) -> impl Future<Output = Result<UserRecord, Self::Error>> + Send + '_;

  /// List stored users. An empty store yields an empty vector, not an
  /// error.
  fn list_users(
    &self,
    query: ListQuery,
  ) -> impl Future<Output = Result<Vec<UserRecord>, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + '_;

  /// Apply all `changes` in one statement — the update is all-or-nothing.
  /// Returns `false` if no row matched `id`.
  ///
  /// Callers must pass at least one change; implementations may reject an
  /// empty slice as a usage error.
  fn update_user(
    &self,
    id: Uuid,
    changes: Vec<FieldChange>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a user by id. Returns `false` if no row matched.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Tests ───────────────────────────────────────────────────────────────────
