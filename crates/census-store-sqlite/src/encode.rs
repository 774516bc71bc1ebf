//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use census_core::user::{FieldValue, UserRecord};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Result;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| crate::Error::DateParse(e.to_string()))
}

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// Convert an already-validated field value into an owned SQLite value for
/// parameter binding.
pub fn encode_field_value(v: &FieldValue) -> rusqlite::types::Value {
  match v {
    FieldValue::Integer(i) => rusqlite::types::Value::Integer(*i),
    FieldValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
    FieldValue::Null => rusqlite::types::Value::Null,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:     String,
  pub last_name:   String,
  pub first_name:  String,
  pub second_name: Option<String>,
  pub age:         u32,
  pub gender:      String,
  pub nationality: String,
  pub created_at:  String,
}

impl RawUser {
  /// Column order must match the SELECT lists in `store.rs`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      last_name:   row.get(1)?,
      first_name:  row.get(2)?,
      second_name: row.get(3)?,
      age:         row.get(4)?,
      gender:      row.get(5)?,
      nationality: row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<UserRecord> {
    Ok(UserRecord {
      id:          decode_uuid(&self.user_id)?,
      last_name:   self.last_name,
      first_name:  self.first_name,
      second_name: self.second_name,
      age:         self.age,
      gender:      self.gender,
      nationality: self.nationality,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}
