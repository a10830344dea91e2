//! Visit — one dated clinical encounter for a patient.
//!
//! Exactly one visit date per record; the BMI is derived from weight and
//! height and recomputed whenever either changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Vital signs taken during the encounter. Temperature, heart rate, and
/// respiratory rate may be skipped at triage; blood pressure never is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
  pub temperature:        Option<f64>,
  pub systolic_pressure:  f64,
  pub diastolic_pressure: f64,
  pub heart_rate:         Option<u32>,
  pub respiratory_rate:   Option<u32>,
  #[serde(default)]
  pub arrhythmia:         bool,
  pub notes:              Option<String>,
}

/// Weight/height measurements with the derived body-mass index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biometrics {
  /// Kilograms.
  pub weight: f64,
  /// Metres.
  pub height: f64,
  /// weight / height², rounded to 2 decimals. Always derived, never
  /// accepted from callers.
  pub bmi:    f64,
}

impl Biometrics {
  /// Build from raw measurements, deriving the BMI.
  pub fn from_measurements(weight: f64, height: f64) -> Result<Self> {
    if !(weight > 0.0) {
      return Err(Error::InvalidMeasurement { field: "weight" });
    }
    if !(height > 0.0) {
      return Err(Error::InvalidMeasurement { field: "height" });
    }
    let bmi = (weight / (height * height) * 100.0).round() / 100.0;
    Ok(Self { weight, height, bmi })
  }
}

/// Risk flags re-asserted at visit time — a superset of the static patient
/// flags, capturing what was observed at this encounter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRiskFactors {
  #[serde(default)]
  pub obesity:               bool,
  #[serde(default)]
  pub smoking:               bool,
  #[serde(default)]
  pub alcohol:               bool,
  #[serde(default)]
  pub stimulant_use:         bool,
  #[serde(default)]
  pub sedentary:             bool,
  #[serde(default)]
  pub prior_cardiac_disease: bool,
  #[serde(default)]
  pub stress:                bool,
  #[serde(default)]
  pub family_stroke_history: bool,
}

/// Comorbidities as observed at this visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comorbidities {
  #[serde(default)]
  pub hypertension: bool,
  #[serde(default)]
  pub diabetes:     bool,
}

/// Free-text clinical narrative fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitNarrative {
  /// Reason for the visit, as stated by the patient.
  pub reason:           Option<String>,
  /// When the presenting symptoms first appeared.
  pub symptom_onset:    Option<NaiveDate>,
  pub prior_conditions: Option<String>,
  pub family_history:   Option<String>,
  pub medications:      Option<String>,
  pub diagnosis:        Option<String>,
}

/// A single dated clinical encounter. Belongs to exactly one patient and is
/// deleted with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
  pub visit_id:      Uuid,
  pub patient_id:    Uuid,
  pub visit_date:    NaiveDate,
  pub vitals:        VitalSigns,
  pub biometrics:    Biometrics,
  pub risk_factors:  VisitRiskFactors,
  pub comorbidities: Comorbidities,
  pub narrative:     VisitNarrative,
  /// Whether a stroke occurred at this visit.
  pub stroke_event:  bool,
}

/// Input to [`crate::store::RecordStore::add_visit`].
/// `visit_id` is assigned by the store; the BMI is derived from
/// `weight`/`height`.
#[derive(Debug, Clone)]
pub struct NewVisit {
  pub patient_id:    Uuid,
  pub visit_date:    NaiveDate,
  pub vitals:        VitalSigns,
  pub weight:        f64,
  pub height:        f64,
  pub risk_factors:  VisitRiskFactors,
  pub comorbidities: Comorbidities,
  pub narrative:     VisitNarrative,
  pub stroke_event:  bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bmi_is_derived_and_rounded() {
    let b = Biometrics::from_measurements(70.0, 1.75).unwrap();
    assert_eq!(b.bmi, 22.86);
  }

  #[test]
  fn zero_height_is_rejected() {
    let err = Biometrics::from_measurements(70.0, 0.0).unwrap_err();
    assert!(matches!(err, Error::InvalidMeasurement { field: "height" }));
  }

  #[test]
  fn negative_weight_is_rejected() {
    let err = Biometrics::from_measurements(-1.0, 1.75).unwrap_err();
    assert!(matches!(err, Error::InvalidMeasurement { field: "weight" }));
  }
}
