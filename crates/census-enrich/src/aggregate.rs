//! Fan-out/join of the three enrichment calls.
//!
//! All three predictions are requested together and joined before any
//! merging happens; the database write that follows in the HTTP layer can
//! therefore never observe a half-enriched record.

use census_core::user::{CandidateUser, NewUser};

use crate::{NameInference, Result};

/// Nationality stored when the upstream returns an empty country list.
/// `ZZ` is the ISO 3166 user-assigned code for "unknown or unspecified".
pub const UNKNOWN_NATIONALITY: &str = "ZZ";

/// Run all three predictions for `input.first_name` concurrently and fold
/// the results into an unsaved [`CandidateUser`].
///
/// `tokio::join!` is a barrier, not a race: the merge runs only once every
/// call has completed. Failures are then surfaced in the fixed order
/// age → gender → nationality, so the "first observed" error is
/// deterministic under injected fakes.
pub async fn enrich<I: NameInference>(
  inference: &I,
  input: NewUser,
) -> Result<CandidateUser> {
  let name = input.first_name.as_str();

  let (age, gender, nationality) = tokio::join!(
    inference.age(name),
    inference.gender(name),
    inference.nationality(name),
  );

  let age = age?;
  let gender = gender?;
  let nationality = nationality?;

  tracing::debug!(
    name,
    age = ?age.age,
    gender = ?gender.gender,
    countries = nationality.country.len(),
    "all predictions joined"
  );

  // Null predictions persist as zero values, matching what the upstream
  // means by them: no data for this name.
  Ok(CandidateUser {
    last_name:   input.last_name,
    first_name:  input.first_name,
    second_name: input.second_name,
    age:         age.age.unwrap_or(0),
    gender:      gender.gender.unwrap_or_default(),
    nationality: nationality
      .country
      .into_iter()
      .next()
      .map(|c| c.country_id)
      .unwrap_or_else(|| UNKNOWN_NATIONALITY.to_owned()),
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
