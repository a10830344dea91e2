//! Patient — the root aggregate of the clinical record model.
//!
//! Visits and appointments are owned by, and lifecycle-bound to, their
//! patient: deleting a patient cascades to both.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Biological sex as recorded on the identity document.
///
/// A closed two-variant enum: any other payload value fails request
/// validation before it can reach the risk pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
  #[serde(rename = "M")]
  Male,
  #[serde(rename = "F")]
  Female,
}

/// National identity document category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
  /// Citizen id card.
  #[serde(rename = "CC")]
  Cc,
  /// Minor's identity card.
  #[serde(rename = "TI")]
  Ti,
  /// Foreigner id card.
  #[serde(rename = "CE")]
  Ce,
}

/// Optional contact and demographic details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
  pub phone:          Option<String>,
  pub address:        Option<String>,
  pub email:          Option<String>,
  pub marital_status: Option<String>,
  pub occupation:     Option<String>,
  pub blood_type:     Option<String>,
  pub insurer:        Option<String>,
}

/// Who to call when the patient cannot answer for themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
  pub name:         Option<String>,
  pub phone:        Option<String>,
  pub relationship: Option<String>,
}

/// Static risk-factor flags kept on the patient record. Editable, not
/// versioned; the per-visit flags on [`crate::visit::Visit`] capture the
/// state observed at each encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRiskFactors {
  #[serde(default)]
  pub hypertension:          bool,
  #[serde(default)]
  pub diabetes:              bool,
  #[serde(default)]
  pub smoking:               bool,
  #[serde(default)]
  pub sedentary:             bool,
  #[serde(default)]
  pub high_cholesterol:      bool,
  #[serde(default)]
  pub family_stroke_history: bool,
}

/// A registered patient. Identity invariant: `document` is unique across
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
  pub patient_id:        Uuid,
  pub created_at:        DateTime<Utc>,
  pub name:              String,
  pub document_type:     DocumentType,
  pub document:          String,
  pub birth_date:        NaiveDate,
  pub sex:               Sex,
  pub contact:           ContactInfo,
  pub emergency_contact: EmergencyContact,
  pub risk_factors:      PatientRiskFactors,
  /// Whether the patient has already suffered a stroke before registration.
  pub prior_stroke:      bool,
}

/// Input to [`crate::store::RecordStore::add_patient`].
/// `patient_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPatient {
  pub name:              String,
  pub document_type:     DocumentType,
  pub document:          String,
  pub birth_date:        NaiveDate,
  pub sex:               Sex,
  pub contact:           ContactInfo,
  pub emergency_contact: EmergencyContact,
  pub risk_factors:      PatientRiskFactors,
  pub prior_stroke:      bool,
}
