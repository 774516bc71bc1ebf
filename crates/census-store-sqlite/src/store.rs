//! [`SqliteStore`] — the SQLite implementation of [`UserStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use census_core::{
  store::{ListQuery, SortOrder, UserStore},
  user::{CandidateUser, FieldChange, UserRecord},
};

use crate::{
  Error, Result,
  encode::{RawUser, encode_dt, encode_field_value, encode_uuid},
  schema::SCHEMA,
};

const SELECT_COLUMNS: &str = "user_id, last_name, first_name, second_name, \
                              age, gender, nationality, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A census user store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  type Error = Error;

  async fn create_user(&self, candidate: CandidateUser) -> Result<UserRecord> {
    let record = UserRecord {
      id:          Uuid::new_v4(),
      last_name:   candidate.last_name,
      first_name:  candidate.first_name,
      second_name: candidate.second_name,
      age:         candidate.age,
      gender:      candidate.gender,
      nationality: candidate.nationality,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(record.id);
    let at_str      = encode_dt(record.created_at);
    let last_name   = record.last_name.clone();
    let first_name  = record.first_name.clone();
    let second_name = record.second_name.clone();
    let age         = record.age;
    let gender      = record.gender.clone();
    let nationality = record.nationality.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, last_name, first_name, second_name,
             age, gender, nationality, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            last_name,
            first_name,
            second_name,
            age,
            gender,
            nationality,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_users(&self, query: ListQuery) -> Result<Vec<UserRecord>> {
    let sql = match query.order {
      SortOrder::CreatedAt => {
        format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY created_at LIMIT ?1")
      }
      SortOrder::AgeAscending => {
        format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY age LIMIT ?1")
      }
      SortOrder::AgeDescending => {
        format!("SELECT {SELECT_COLUMNS} FROM users ORDER BY age DESC LIMIT ?1")
      }
    };
    let limit = query.limit;

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| RawUser::from_row(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_record).collect()
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SELECT_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              |row| RawUser::from_row(row),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_record).transpose()
  }

  async fn update_user(
    &self,
    id: Uuid,
    changes: Vec<FieldChange>,
  ) -> Result<bool> {
    if changes.is_empty() {
      return Err(Error::EmptyUpdate);
    }

    // One statement for all columns: the update is all-or-nothing. Columns
    // are sorted (and deduplicated) by name so the statement text is
    // deterministic regardless of payload iteration order.
    let mut changes = changes;
    changes.sort_by_key(|c| c.field.column());
    changes.dedup_by_key(|c| c.field);

    let assignments = changes
      .iter()
      .enumerate()
      .map(|(i, c)| format!("{} = ?{}", c.field.column(), i + 1))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "UPDATE users SET {assignments} WHERE user_id = ?{}",
      changes.len() + 1
    );

    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        let mut params: Vec<rusqlite::types::Value> =
          changes.iter().map(|c| encode_field_value(&c.value)).collect();
        params.push(rusqlite::types::Value::Text(id_str));
        Ok(conn.execute(&sql, rusqlite::params_from_iter(params))?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(affected > 0)
  }
}
