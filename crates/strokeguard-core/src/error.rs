//! Error types for `strokeguard-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("patient not found: {0}")]
  PatientNotFound(Uuid),

  #[error("visit not found: {0}")]
  VisitNotFound(Uuid),

  #[error("appointment not found: {0}")]
  AppointmentNotFound(Uuid),

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("document {0} is already registered")]
  DuplicateDocument(String),

  #[error("username {0} is already taken")]
  DuplicateUsername(String),

  #[error("invalid measurement: {field} must be positive")]
  InvalidMeasurement { field: &'static str },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
