//! JSON REST API for census.
//!
//! Exposes an axum [`Router`] backed by any [`census_core::store::UserStore`]
//! and any [`census_enrich::NameInference`]. TLS and transport concerns are
//! the caller's responsibility.

pub mod error;
pub mod users;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use census_core::store::UserStore;
use census_enrich::NameInference;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("census.db") }

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `CENSUS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. No process-wide
/// singletons: the store and the inference client are explicit handles.
#[derive(Clone)]
pub struct AppState<S, I> {
  pub store:     Arc<S>,
  pub inference: Arc<I>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised router for `state`.
pub fn router<S, I>(state: AppState<S, I>) -> Router
where
  S: UserStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  I: NameInference + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/users",
      get(users::list::<S, I>).post(users::create::<S, I>),
    )
    .route(
      "/users/{id}",
      get(users::get_one::<S, I>)
        .patch(users::update_one::<S, I>)
        .delete(users::delete_one::<S, I>),
    )
    .route("/users/health", get(users::health))
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// `GET /health` — process-level liveness probe.
async fn health() -> &'static str { "health" }

#[cfg(test)]
mod tests;
