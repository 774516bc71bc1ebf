//! User record types and the updatable-field allow-list.
//!
//! A [`UserRecord`] is the persisted entity. A [`CandidateUser`] is the same
//! shape before the store has assigned identity; it is produced by the
//! enrichment aggregator and consumed exactly once by
//! [`UserStore::create_user`](crate::store::UserStore::create_user).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Records ─────────────────────────────────────────────────────────────────

/// The persisted user entity.
///
/// `age`, `gender` and `nationality` are inferred from the first name at
/// creation time. They are independent predictions and are never required to
/// be consistent with each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
  /// Store-assigned; immutable after creation.
  pub id:          Uuid,
  pub last_name:   String,
  pub first_name:  String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub second_name: Option<String>,
  pub age:         u32,
  pub gender:      String,
  /// ISO-like country code taken from the most probable prediction.
  pub nationality: String,
  /// Store-assigned; default ordering key for listings.
  pub created_at:  DateTime<Utc>,
}

/// An enriched user that has not been persisted yet (no identity, no
/// creation timestamp).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUser {
  pub last_name:   String,
  pub first_name:  String,
  pub second_name: Option<String>,
  pub age:         u32,
  pub gender:      String,
  pub nationality: String,
}

/// The inbound creation payload: just the names. Everything else is inferred.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
  pub last_name:   String,
  pub first_name:  String,
  pub second_name: Option<String>,
}

impl NewUser {
  /// Both required names must be non-empty after trimming.
  pub fn validate(&self) -> Result<()> {
    if self.last_name.trim().is_empty() {
      return Err(Error::EmptyName("lastName"));
    }
    if self.first_name.trim().is_empty() {
      return Err(Error::EmptyName("firstName"));
    }
    Ok(())
  }
}

// ─── Updatable fields ────────────────────────────────────────────────────────

/// The closed set of columns a partial update may touch.
///
/// Update SQL is assembled only from [`UserField::column`] values, so a
/// caller-supplied field name can never reach the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UserField {
  Age,
  FirstName,
  Gender,
  LastName,
  Nationality,
  SecondName,
}

impl UserField {
  /// Accepts both the wire spelling (`secondName`) and the column spelling
  /// (`second_name`). Anything else is rejected by the caller.
  pub fn parse(key: &str) -> Option<Self> {
    match key {
      "age" => Some(Self::Age),
      "firstName" | "first_name" => Some(Self::FirstName),
      "gender" => Some(Self::Gender),
      "lastName" | "last_name" => Some(Self::LastName),
      "nationality" => Some(Self::Nationality),
      "secondName" | "second_name" => Some(Self::SecondName),
      _ => None,
    }
  }

  pub fn column(self) -> &'static str {
    match self {
      Self::Age => "age",
      Self::FirstName => "first_name",
      Self::Gender => "gender",
      Self::LastName => "last_name",
      Self::Nationality => "nationality",
      Self::SecondName => "second_name",
    }
  }

  /// Check a raw JSON value against this field's column type.
  pub fn coerce(self, value: &Value) -> Result<FieldValue> {
    match self {
      Self::Age => match value.as_u64() {
        Some(n) if n <= u64::from(u32::MAX) => Ok(FieldValue::Integer(n as i64)),
        _ => Err(Error::InvalidFieldValue {
          field:    self.column(),
          expected: "a non-negative integer",
        }),
      },
      Self::SecondName => match value {
        Value::Null => Ok(FieldValue::Null),
        Value::String(s) => Ok(FieldValue::Text(s.clone())),
        _ => Err(Error::InvalidFieldValue {
          field:    self.column(),
          expected: "a string or null",
        }),
      },
      _ => match value.as_str() {
        Some(s) => Ok(FieldValue::Text(s.to_owned())),
        None => Err(Error::InvalidFieldValue {
          field:    self.column(),
          expected: "a string",
        }),
      },
    }
  }
}

/// A value already checked against its column's type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Integer(i64),
  Text(String),
  Null,
}

/// One allow-listed column together with its new value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
  pub field: UserField,
  pub value: FieldValue,
}

impl FieldChange {
  /// Validate one `field name → value` pair from a partial-update payload.
  pub fn parse(key: &str, value: &Value) -> Result<Self> {
    let field = UserField::parse(key)
      .ok_or_else(|| Error::UnknownField(key.to_owned()))?;
    let value = field.coerce(value)?;
    Ok(Self { field, value })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn parse_accepts_wire_and_column_spellings() {
    assert_eq!(UserField::parse("lastName"), Some(UserField::LastName));
    assert_eq!(UserField::parse("last_name"), Some(UserField::LastName));
    assert_eq!(UserField::parse("secondName"), Some(UserField::SecondName));
    assert_eq!(UserField::parse("id"), None);
    assert_eq!(UserField::parse("created_at"), None);
    assert_eq!(UserField::parse("age; DROP TABLE users"), None);
  }

  #[test]
  fn coerce_age_rejects_negatives_and_strings() {
    assert!(matches!(
      UserField::Age.coerce(&json!(42)).unwrap(),
      FieldValue::Integer(42)
    ));
    assert!(UserField::Age.coerce(&json!(-1)).is_err());
    assert!(UserField::Age.coerce(&json!("42")).is_err());
    assert!(UserField::Age.coerce(&json!(4.2)).is_err());
  }

  #[test]
  fn coerce_second_name_allows_null() {
    assert_eq!(
      UserField::SecondName.coerce(&json!(null)).unwrap(),
      FieldValue::Null
    );
    assert!(UserField::LastName.coerce(&json!(null)).is_err());
  }

  #[test]
  fn new_user_requires_both_names() {
    let ok = NewUser {
      last_name:   "Liddell".into(),
      first_name:  "Alice".into(),
      second_name: None,
    };
    assert!(ok.validate().is_ok());

    let missing = NewUser {
      last_name:   "  ".into(),
      first_name:  "Alice".into(),
      second_name: None,
    };
    assert!(matches!(
      missing.validate().unwrap_err(),
      Error::EmptyName("lastName")
    ));
  }
}
