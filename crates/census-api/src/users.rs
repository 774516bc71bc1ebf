//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/users` | Body: [`NewUser`]; enriches, stores, returns 201 |
//! | `GET`    | `/users` | Optional `?sort=age.a\|age.d` and `?limit=<n>` |
//! | `GET`    | `/users/:id` | 404 if not found |
//! | `PATCH`  | `/users/:id` | Body: field→value map; 204 on success |
//! | `DELETE` | `/users/:id` | 204 on success |
//! | `GET`    | `/users/health` | Fixed liveness string |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  store::{ListQuery, UserStore},
  user::{FieldChange, NewUser, UserRecord},
};
use census_enrich::NameInference;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /users` — body: `{"lastName":"...","firstName":"...","secondName":"..."}`
///
/// The three enrichment calls run concurrently and are joined before the
/// insert; if any of them fails, nothing is persisted.
pub async fn create<S, I>(
  State(state): State<AppState<S, I>>,
  payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference,
{
  let Json(new_user) =
    payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  new_user
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let candidate =
    census_enrich::enrich(state.inference.as_ref(), new_user).await?;

  let record = state
    .store
    .create_user(candidate)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(id = %record.id, "user created");
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Sort token; anything other than `age.a` / `age.d` means insertion
  /// order.
  pub sort:  Option<String>,
  /// Kept as a string so a non-numeric value falls back to the default
  /// instead of rejecting the request.
  pub limit: Option<String>,
}

/// `GET /users[?sort=<token>][&limit=<n>]`
pub async fn list<S, I>(
  State(state): State<AppState<S, I>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserRecord>>, ApiError>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference,
{
  let query =
    ListQuery::from_raw(params.sort.as_deref(), params.limit.as_deref());

  let users = state
    .store
    .list_users(query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(users))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S, I>(
  State(state): State<AppState<S, I>>,
  Path(id): Path<Uuid>,
) -> Result<Json<UserRecord>, ApiError>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference,
{
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /users/:id` — body: a JSON object of field→value pairs.
///
/// Field names are checked against the updatable-attribute allow-list and
/// values against their column types; all changes are applied in a single
/// statement, so a multi-field update is all-or-nothing.
pub async fn update_one<S, I>(
  State(state): State<AppState<S, I>>,
  Path(id): Path<Uuid>,
  payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference,
{
  let Json(fields) =
    payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  if fields.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".to_string()));
  }

  let changes = fields
    .iter()
    .map(|(key, value)| FieldChange::parse(key, value))
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let found = state
    .store
    .update_user(id, changes)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !found {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }

  tracing::info!(%id, "user updated");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /users/:id`
pub async fn delete_one<S, I>(
  State(state): State<AppState<S, I>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: UserStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference,
{
  let found = state
    .store
    .delete_user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !found {
    return Err(ApiError::NotFound(format!("user {id} not found")));
  }

  tracing::info!(%id, "user deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Health ───────────────────────────────────────────────────────────────────

/// `GET /users/health` — endpoint-level liveness probe.
pub async fn health() -> &'static str { "users" }
