//! Risk scorer: classifier probability plus the fixed-threshold label,
//! bundled with the explanation into one assessment.

use std::path::Path;

use serde::Serialize;
use strokeguard_core::{patient::Patient, visit::Visit};

use crate::{
  Result,
  artifact::ClassifierArtifact,
  explain::{self, FeatureContribution},
  features::FeatureVector,
};

/// Probability at or above which a patient is classified high risk.
/// A fixed policy constant, never derived per patient.
pub const RISK_THRESHOLD: f64 = 0.7;

/// The thresholded risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLabel {
  High,
  Low,
}

impl RiskLabel {
  pub fn from_probability(probability: f64) -> Self {
    if probability >= RISK_THRESHOLD { Self::High } else { Self::Low }
  }
}

/// The full structured result of scoring one patient.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
  pub probability:          f64,
  pub risk:                 RiskLabel,
  /// Risk-appropriate narrative sentence.
  pub context:              String,
  /// At most 5 entries; empty when risk is low.
  pub explanatory_features: Vec<FeatureContribution>,
  /// Always exactly 5 entries, switched on the risk label.
  pub recommendations:      Vec<String>,
}

/// The scoring service: an immutable classifier artifact behind a plain
/// method. Constructed once at startup and injected into request handlers.
#[derive(Debug, Clone)]
pub struct RiskScorer {
  artifact: ClassifierArtifact,
}

impl RiskScorer {
  pub fn new(artifact: ClassifierArtifact) -> Self { Self { artifact } }

  /// Load the artifact from disk and wrap it. Any failure here should abort
  /// startup: without a classifier the scoring capability does not exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self::new(ClassifierArtifact::load(path)?))
  }

  /// Score a patient from their demographics and most recent visit.
  pub fn assess(&self, patient: &Patient, visit: &Visit) -> RiskAssessment {
    let vector = FeatureVector::from_latest_visit(patient, visit);
    let probability = self.artifact.predict_proba(&vector);
    let risk = RiskLabel::from_probability(probability);

    RiskAssessment {
      probability,
      risk,
      context: explain::context_sentence(risk).to_owned(),
      explanatory_features: explain::top_features(&self.artifact, &vector, risk),
      recommendations: explain::recommendations(risk)
        .iter()
        .map(|r| (*r).to_owned())
        .collect(),
    }
  }

  /// Probability alone, without the explanation — what the population
  /// listing needs.
  pub fn probability(&self, patient: &Patient, visit: &Visit) -> f64 {
    let vector = FeatureVector::from_latest_visit(patient, visit);
    self.artifact.predict_proba(&vector)
  }
}
