//! Handler tests driving the real router with an in-memory store and a
//! stubbed inference client.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use census_core::user::CandidateUser;
use census_enrich::{
  Error as EnrichError, NameInference, Result as EnrichResult,
  client::{
    AgePrediction, CountryScore, Endpoint, GenderPrediction,
    NationalityPrediction,
  },
};
use census_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, router};

// ─── Stub inference ──────────────────────────────────────────────────────────

/// Deterministic predictions; `fail` makes exactly one endpoint error.
#[derive(Clone)]
struct StubInference {
  age:       u32,
  gender:    &'static str,
  countries: Vec<&'static str>,
  fail:      Option<Endpoint>,
}

impl StubInference {
  fn good() -> Self {
    Self {
      age:       31,
      gender:    "female",
      countries: vec!["GB", "US"],
      fail:      None,
    }
  }

  fn check(&self, endpoint: Endpoint) -> EnrichResult<()> {
    if self.fail == Some(endpoint) {
      // A request built from an unparseable URL yields a real
      // reqwest::Error without touching the network.
      let err = reqwest::Client::new()
        .get("this is not a url")
        .build()
        .unwrap_err();
      return Err(EnrichError::Transport(endpoint, err));
    }
    Ok(())
  }
}

impl NameInference for StubInference {
  async fn age(&self, name: &str) -> EnrichResult<AgePrediction> {
    self.check(Endpoint::Age)?;
    Ok(AgePrediction {
      count: 100,
      name:  name.to_owned(),
      age:   Some(self.age),
    })
  }

  async fn gender(&self, name: &str) -> EnrichResult<GenderPrediction> {
    self.check(Endpoint::Gender)?;
    Ok(GenderPrediction {
      count:       100,
      name:        name.to_owned(),
      gender:      Some(self.gender.to_owned()),
      probability: 0.97,
    })
  }

  async fn nationality(&self, name: &str) -> EnrichResult<NationalityPrediction> {
    self.check(Endpoint::Nationality)?;
    Ok(NationalityPrediction {
      count:   100,
      name:    name.to_owned(),
      country: self
        .countries
        .iter()
        .map(|c| CountryScore {
          country_id:  (*c).to_owned(),
          probability: 0.3,
        })
        .collect(),
    })
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

type TestState = AppState<SqliteStore, StubInference>;

async fn make_state(inference: StubInference) -> TestState {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState { store: Arc::new(store), inference: Arc::new(inference) }
}

async fn send(
  state: &TestState,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let req = builder.body(body).unwrap();
  router(state.clone()).oneshot(req).await.unwrap()
}

async fn body_json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn seed(state: &TestState, first_name: &str, age: u32) -> Uuid {
  use census_core::store::UserStore as _;
  state
    .store
    .create_user(CandidateUser {
      last_name:   "Liddell".into(),
      first_name:  first_name.into(),
      second_name: None,
      age,
      gender:      "female".into(),
      nationality: "GB".into(),
    })
    .await
    .unwrap()
    .id
}

fn new_user_body() -> Value {
  json!({ "lastName": "Liddell", "firstName": "Alice" })
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_201_with_enriched_record() {
  let state = make_state(StubInference::good()).await;

  let resp = send(&state, "POST", "/users", Some(new_user_body())).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let body = body_json(resp).await;
  assert_eq!(body["lastName"], "Liddell");
  assert_eq!(body["firstName"], "Alice");
  assert_eq!(body["age"], 31);
  assert_eq!(body["gender"], "female");
  // Highest-probability country is first in the stub list.
  assert_eq!(body["nationality"], "GB");
  assert!(body["id"].as_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn create_with_missing_required_field_is_400() {
  let state = make_state(StubInference::good()).await;

  let resp =
    send(&state, "POST", "/users", Some(json!({ "firstName": "Alice" })))
      .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_empty_first_name_is_400() {
  let state = make_state(StubInference::good()).await;

  let resp = send(
    &state,
    "POST",
    "/users",
    Some(json!({ "lastName": "Liddell", "firstName": "" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn enrichment_failure_is_500_and_persists_nothing() {
  for endpoint in [Endpoint::Age, Endpoint::Gender, Endpoint::Nationality] {
    let state = make_state(StubInference {
      fail: Some(endpoint),
      ..StubInference::good()
    })
    .await;

    let resp = send(&state, "POST", "/users", Some(new_user_body())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = send(&state, "GET", "/users", None).await;
    assert_eq!(body_json(resp).await, json!([]));
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_empty_store_returns_empty_array() {
  let state = make_state(StubInference::good()).await;

  let resp = send(&state, "GET", "/users", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, json!([]));
}

#[tokio::test]
async fn list_sorts_by_age_when_asked() {
  let state = make_state(StubInference::good()).await;
  seed(&state, "Grace", 85).await;
  seed(&state, "Joan", 29).await;
  seed(&state, "Alan", 41).await;

  let resp = send(&state, "GET", "/users?sort=age.a", None).await;
  let ages: Vec<_> = body_json(resp)
    .await
    .as_array()
    .unwrap()
    .iter()
    .map(|u| u["age"].as_u64().unwrap())
    .collect();
  assert_eq!(ages, [29, 41, 85]);

  let resp = send(&state, "GET", "/users?sort=age.d", None).await;
  let ages: Vec<_> = body_json(resp)
    .await
    .as_array()
    .unwrap()
    .iter()
    .map(|u| u["age"].as_u64().unwrap())
    .collect();
  assert_eq!(ages, [85, 41, 29]);
}

#[tokio::test]
async fn unknown_sort_token_behaves_like_unset() {
  let state = make_state(StubInference::good()).await;
  seed(&state, "Grace", 85).await;
  seed(&state, "Joan", 29).await;

  let unsorted = body_json(send(&state, "GET", "/users", None).await).await;
  let bogus =
    body_json(send(&state, "GET", "/users?sort=name.z", None).await).await;
  assert_eq!(unsorted, bogus);
}

#[tokio::test]
async fn limit_defaults_to_three_and_tolerates_garbage() {
  let state = make_state(StubInference::good()).await;
  for i in 0..5 {
    seed(&state, "Ada", 20 + i).await;
  }

  let defaulted = body_json(send(&state, "GET", "/users", None).await).await;
  assert_eq!(defaulted.as_array().unwrap().len(), 3);

  let garbage =
    body_json(send(&state, "GET", "/users?limit=abc", None).await).await;
  assert_eq!(garbage.as_array().unwrap().len(), 3);

  let explicit =
    body_json(send(&state, "GET", "/users?limit=10", None).await).await;
  assert_eq!(explicit.as_array().unwrap().len(), 5);
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_roundtrips_a_created_user() {
  let state = make_state(StubInference::good()).await;

  let created =
    body_json(send(&state, "POST", "/users", Some(new_user_body())).await)
      .await;
  let id = created["id"].as_str().unwrap().to_owned();

  let resp = send(&state, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await, created);
}

#[tokio::test]
async fn get_missing_user_is_404() {
  let state = make_state(StubInference::good()).await;

  let resp =
    send(&state, "GET", &format!("/users/{}", Uuid::new_v4()), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_with_malformed_id_is_400() {
  let state = make_state(StubInference::good()).await;

  let resp = send(&state, "GET", "/users/not-a-uuid", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn patch_updates_only_the_named_field() {
  let state = make_state(StubInference::good()).await;
  let id = seed(&state, "Alice", 31).await;

  let resp = send(
    &state,
    "PATCH",
    &format!("/users/{id}"),
    Some(json!({ "age": 42 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  assert!(bytes.is_empty());

  let body =
    body_json(send(&state, "GET", &format!("/users/{id}"), None).await).await;
  assert_eq!(body["age"], 42);
  assert_eq!(body["firstName"], "Alice");
  assert_eq!(body["gender"], "female");
}

#[tokio::test]
async fn patch_missing_user_is_404() {
  let state = make_state(StubInference::good()).await;

  let resp = send(
    &state,
    "PATCH",
    &format!("/users/{}", Uuid::new_v4()),
    Some(json!({ "age": 42 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_unknown_field_is_400() {
  let state = make_state(StubInference::good()).await;
  let id = seed(&state, "Alice", 31).await;

  let resp = send(
    &state,
    "PATCH",
    &format!("/users/{id}"),
    Some(json!({ "favouriteColour": "red" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_ill_typed_value_is_400_and_writes_nothing() {
  let state = make_state(StubInference::good()).await;
  let id = seed(&state, "Alice", 31).await;

  let resp = send(
    &state,
    "PATCH",
    &format!("/users/{id}"),
    Some(json!({ "gender": "nonbinary", "age": "old" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  // The valid half of the payload must not have been applied.
  let body =
    body_json(send(&state, "GET", &format!("/users/{id}"), None).await).await;
  assert_eq!(body["gender"], "female");
  assert_eq!(body["age"], 31);
}

#[tokio::test]
async fn patch_empty_object_is_400() {
  let state = make_state(StubInference::good()).await;
  let id = seed(&state, "Alice", 31).await;

  let resp =
    send(&state, "PATCH", &format!("/users/{id}"), Some(json!({}))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_then_get_is_404() {
  let state = make_state(StubInference::good()).await;
  let id = seed(&state, "Alice", 31).await;

  let resp = send(&state, "DELETE", &format!("/users/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&state, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_user_is_404() {
  let state = make_state(StubInference::good()).await;

  let resp =
    send(&state, "DELETE", &format!("/users/{}", Uuid::new_v4()), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoints_return_fixed_strings() {
  let state = make_state(StubInference::good()).await;

  let resp = send(&state, "GET", "/health", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  assert_eq!(&bytes[..], b"health");

  let resp = send(&state, "GET", "/users/health", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  assert_eq!(&bytes[..], b"users");
}
