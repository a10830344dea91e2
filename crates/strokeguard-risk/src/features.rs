//! The 21-field feature schema shared between the training pipeline and
//! serving-time extraction.
//!
//! Field order is a hard contract: the classifier is order-sensitive, and
//! artifacts are validated against [`FEATURE_NAMES`] at load time.

use strokeguard_core::{
  patient::{Patient, Sex},
  visit::Visit,
};

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 21;

/// Canonical feature order. Must never be reordered without refitting the
/// classifier.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
  "age",
  "sex",
  "temperature",
  "systolic_pressure",
  "diastolic_pressure",
  "heart_rate",
  "respiratory_rate",
  "weight",
  "height",
  "bmi",
  "arrhythmia",
  "obesity",
  "smoking",
  "alcohol",
  "stimulant_use",
  "sedentary",
  "prior_cardiac_disease",
  "stress",
  "pressure_delta",
  "visits_last_year",
  "heart_rate_std_last_year",
];

// Trend features are computed over full visit history by the training
// pipeline. Serving-time extraction works from a single visit and pins them
// to these defaults — the shipped artifact was fitted with the same serving
// distribution in mind.
const SERVING_PRESSURE_DELTA: f64 = 0.0;
const SERVING_VISITS_LAST_YEAR: f64 = 1.0;
const SERVING_HEART_RATE_STD: f64 = 0.0;

/// A populated feature vector in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
  values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
  /// Derive the serving-time vector from a patient's demographics and their
  /// most recent visit.
  pub fn from_latest_visit(patient: &Patient, visit: &Visit) -> Self {
    let v = &visit.vitals;
    let b = &visit.biometrics;
    let rf = &visit.risk_factors;

    let values = [
      age_in_years(patient, visit),
      encode_sex(patient.sex),
      v.temperature.unwrap_or(0.0),
      v.systolic_pressure,
      v.diastolic_pressure,
      v.heart_rate.map(f64::from).unwrap_or(0.0),
      v.respiratory_rate.map(f64::from).unwrap_or(0.0),
      b.weight,
      b.height,
      b.bmi,
      encode_flag(v.arrhythmia),
      encode_flag(rf.obesity),
      encode_flag(rf.smoking),
      encode_flag(rf.alcohol),
      encode_flag(rf.stimulant_use),
      encode_flag(rf.sedentary),
      encode_flag(rf.prior_cardiac_disease),
      encode_flag(rf.stress),
      SERVING_PRESSURE_DELTA,
      SERVING_VISITS_LAST_YEAR,
      SERVING_HEART_RATE_STD,
    ];

    Self { values }
  }

  pub fn values(&self) -> &[f64; FEATURE_COUNT] { &self.values }

  /// Value at a schema index. Panics on out-of-range indices, which cannot
  /// occur for indices taken from [`FEATURE_NAMES`].
  pub fn value(&self, index: usize) -> f64 { self.values[index] }
}

/// Age at the visit date in years, one decimal place.
fn age_in_years(patient: &Patient, visit: &Visit) -> f64 {
  let days = (visit.visit_date - patient.birth_date).num_days() as f64;
  (days / 365.25 * 10.0).round() / 10.0
}

fn encode_sex(sex: Sex) -> f64 {
  match sex {
    Sex::Male => 0.0,
    Sex::Female => 1.0,
  }
}

fn encode_flag(flag: bool) -> f64 {
  if flag { 1.0 } else { 0.0 }
}
