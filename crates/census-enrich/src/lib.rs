//! Demographic enrichment for census.
//!
//! Three independent upstream services predict age, gender and nationality
//! from a first name. [`client::HttpInference`] performs the real HTTP
//! calls; [`aggregate::enrich`] fans the three calls out, joins them, and
//! folds the results into a [`census_core::user::CandidateUser`].
//!
//! The seam between the two is the [`client::NameInference`] trait, which
//! lets tests drive the aggregator with deterministic fakes.

pub mod aggregate;
pub mod client;
pub mod error;

pub use aggregate::enrich;
pub use client::{HttpInference, NameInference};
pub use error::{Error, Result};
