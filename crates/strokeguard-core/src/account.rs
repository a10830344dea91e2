//! User account — the login identity for clinic staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A login identity. `username` is unique across the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
  pub account_id:    Uuid,
  pub created_at:    DateTime<Utc>,
  /// Display name shown in the UI.
  pub name:          String,
  pub username:      String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`. Never serialised into
  /// responses.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
}

/// Input to [`crate::store::RecordStore::add_account`].
/// The password is hashed by the caller before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub name:          String,
  pub username:      String,
  pub password_hash: String,
}
