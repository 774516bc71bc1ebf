//! Outbound calls to the three name-inference services.
//!
//! Each call is `GET <endpoint>?name=<value>`; the name is the only
//! parameter. No retries, no caching — identical names trigger repeated
//! upstream calls.

use std::{fmt, future::Future, time::Duration};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

// ─── Endpoints ───────────────────────────────────────────────────────────────

const AGE_API: &str = "https://api.agify.io/";
const GENDER_API: &str = "https://api.genderize.io/";
const NATIONALITY_API: &str = "https://api.nationalize.io/";

/// Identifies which upstream a call (or failure) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  Age,
  Gender,
  Nationality,
}

impl Endpoint {
  fn url(self) -> &'static str {
    match self {
      Self::Age => AGE_API,
      Self::Gender => GENDER_API,
      Self::Nationality => NATIONALITY_API,
    }
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Age => "age api",
      Self::Gender => "gender api",
      Self::Nationality => "nationality api",
    })
  }
}

// ─── Prediction shapes ───────────────────────────────────────────────────────

/// Response of the age-prediction service.
#[derive(Debug, Clone, Deserialize)]
pub struct AgePrediction {
  /// Sample count the upstream based its prediction on.
  #[serde(default)]
  pub count: u64,
  /// Echo of the requested name.
  pub name:  String,
  /// `None` when the upstream has no data for the name.
  pub age:   Option<u32>,
}

/// Response of the gender-prediction service.
#[derive(Debug, Clone, Deserialize)]
pub struct GenderPrediction {
  #[serde(default)]
  pub count:       u64,
  pub name:        String,
  pub gender:      Option<String>,
  #[serde(default)]
  pub probability: f32,
}

/// Response of the nationality-prediction service. The `country` list is
/// ordered most-probable-first by the upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct NationalityPrediction {
  #[serde(default)]
  pub count:   u64,
  pub name:    String,
  #[serde(default)]
  pub country: Vec<CountryScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryScore {
  pub country_id:  String,
  pub probability: f32,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// One operation per upstream prediction service.
///
/// Implemented by [`HttpInference`] for real traffic and by in-test fakes so
/// the aggregator's join behaviour can be exercised deterministically.
pub trait NameInference: Send + Sync {
  fn age<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<AgePrediction>> + Send + 'a;

  fn gender<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<GenderPrediction>> + Send + 'a;

  fn nationality<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<NationalityPrediction>> + Send + 'a;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Real [`NameInference`] over HTTP.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpInference {
  client: reqwest::Client,
}

impl HttpInference {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client })
  }

  async fn fetch<T: DeserializeOwned>(
    &self,
    endpoint: Endpoint,
    name: &str,
  ) -> Result<T> {
    let response = self
      .client
      .get(endpoint.url())
      .query(&[("name", name)])
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| Error::Transport(endpoint, e))?;

    tracing::debug!(%endpoint, name, "prediction response received");

    response.json().await.map_err(|e| Error::Decode(endpoint, e))
  }
}

impl NameInference for HttpInference {
  async fn age(&self, name: &str) -> Result<AgePrediction> {
    self.fetch(Endpoint::Age, name).await
  }

  async fn gender(&self, name: &str) -> Result<GenderPrediction> {
    self.fetch(Endpoint::Gender, name).await
  }

  async fn nationality(&self, name: &str) -> Result<NationalityPrediction> {
    self.fetch(Endpoint::Nationality, name).await
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  // Bodies mirror the documented upstream responses; decoding goes through
  // the same serde path `Response::json` uses.

  #[test]
  fn decode_age_prediction() {
    let body = r#"{"count":298219,"name":"michael","age":62}"#;
    let p: AgePrediction = serde_json::from_str(body).unwrap();
    assert_eq!(p.name, "michael");
    assert_eq!(p.age, Some(62));
    assert_eq!(p.count, 298219);
  }

  #[test]
  fn decode_age_prediction_with_null_age() {
    let body = r#"{"count":0,"name":"zzxxq","age":null}"#;
    let p: AgePrediction = serde_json::from_str(body).unwrap();
    assert_eq!(p.age, None);
  }

  #[test]
  fn decode_gender_prediction() {
    let body =
      r#"{"count":1094417,"name":"maria","gender":"female","probability":0.98}"#;
    let p: GenderPrediction = serde_json::from_str(body).unwrap();
    assert_eq!(p.gender.as_deref(), Some("female"));
  }

  #[test]
  fn decode_nationality_prediction() {
    let body = r#"{
      "count": 128,
      "name": "ivan",
      "country": [
        {"country_id": "BG", "probability": 0.22},
        {"country_id": "RU", "probability": 0.17}
      ]
    }"#;
    let p: NationalityPrediction = serde_json::from_str(body).unwrap();
    assert_eq!(p.country.len(), 2);
    assert_eq!(p.country[0].country_id, "BG");
  }

  #[test]
  fn decode_nationality_prediction_missing_country_list() {
    let body = r#"{"name":"zzxxq"}"#;
    let p: NationalityPrediction = serde_json::from_str(body).unwrap();
    assert!(p.country.is_empty());
    assert_eq!(p.count, 0);
  }

  #[test]
  fn malformed_body_is_a_decode_error() {
    let body = r#"{"count":"not a number","name":42}"#;
    assert!(serde_json::from_str::<AgePrediction>(body).is_err());
  }
}
