//! Appointment — a scheduled or completed service slot for a patient.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the appointment stands in its lifecycle.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
  /// Scheduled, patient not yet arrived.
  #[default]
  Awaiting,
  /// Arrival registered at reception.
  Arrived,
  Completed,
  Cancelled,
}

/// A service slot. Belongs to exactly one patient and is deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
  pub appointment_id: Uuid,
  pub patient_id:     Uuid,
  pub scheduled_at:   DateTime<Utc>,
  /// Service type, e.g. "general consultation".
  pub service:        String,
  /// Name of the attending staff member, if assigned.
  pub staff_name:     Option<String>,
  pub status:         AppointmentStatus,
  pub notes:          Option<String>,
}

/// Input to [`crate::store::RecordStore::add_appointment`].
/// `appointment_id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAppointment {
  pub patient_id:   Uuid,
  pub scheduled_at: DateTime<Utc>,
  pub service:      String,
  pub staff_name:   Option<String>,
  pub status:       AppointmentStatus,
  pub notes:        Option<String>,
}
