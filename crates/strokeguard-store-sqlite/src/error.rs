//! Error type for `strokeguard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] strokeguard_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("patient not found: {0}")]
  PatientNotFound(uuid::Uuid),

  #[error("visit not found: {0}")]
  VisitNotFound(uuid::Uuid),

  #[error("appointment not found: {0}")]
  AppointmentNotFound(uuid::Uuid),

  /// Attempted to register a document number that is already taken.
  #[error("document {0} is already registered")]
  DuplicateDocument(String),

  #[error("username {0} is already taken")]
  DuplicateUsername(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
