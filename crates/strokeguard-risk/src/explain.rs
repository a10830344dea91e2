//! Explanation builder: ranks clinically meaningful features by the
//! classifier's global importance weights and attaches the narrative
//! context and recommendation strings for the risk label.

use serde::Serialize;

use crate::{
  artifact::ClassifierArtifact,
  features::{FEATURE_NAMES, FeatureVector},
  scorer::RiskLabel,
};

/// How many explanatory features a high-risk response carries at most.
const TOP_FEATURES: usize = 5;

/// Features eligible for explanation: the clinically meaningful subset.
/// Excludes the sex encoding and the three trend features — serving-time
/// constants and encoding artifacts would read as noise next to "most
/// influential factors".
const EXPLAINED_FEATURES: [&str; 17] = [
  "age",
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
];

/// One explanatory feature: its name, its value in the scored vector, and
/// the classifier's global importance weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
  pub feature: String,
  pub value:   f64,
  pub weight:  f64,
}

/// The top explanatory features for a high-risk result, by importance
/// weight descending (ties keep schema order). Low risk yields an empty
/// list: no causal story is suggested for patients below the threshold.
pub fn top_features(
  artifact: &ClassifierArtifact,
  vector: &FeatureVector,
  label: RiskLabel,
) -> Vec<FeatureContribution> {
  if label == RiskLabel::Low {
    return Vec::new();
  }

  let mut contributions: Vec<FeatureContribution> = FEATURE_NAMES
    .iter()
    .enumerate()
    .filter(|(_, name)| EXPLAINED_FEATURES.contains(name))
    .map(|(index, name)| FeatureContribution {
      feature: (*name).to_owned(),
      value:   vector.value(index),
      weight:  artifact.importance(index),
    })
    .collect();

  // Stable sort: equal weights keep their schema order.
  contributions.sort_by(|a, b| {
    b.weight.partial_cmp(&a.weight).unwrap_or(std::cmp::Ordering::Equal)
  });
  contributions.truncate(TOP_FEATURES);
  contributions
}

/// Risk-appropriate context sentence for the response narrative.
pub fn context_sentence(label: RiskLabel) -> &'static str {
  match label {
    RiskLabel::High => {
      "The clinical profile at the most recent visit places this patient \
       above the high-risk threshold for a cerebrovascular event."
    }
    RiskLabel::Low => {
      "The clinical profile at the most recent visit does not indicate an \
       elevated short-term risk of a cerebrovascular event."
    }
  }
}

/// The fixed, ordered recommendation list for a risk label. No per-patient
/// customisation beyond the label itself.
pub fn recommendations(label: RiskLabel) -> [&'static str; 5] {
  match label {
    RiskLabel::High => [
      "Refer the patient for neurological evaluation as soon as possible.",
      "Monitor blood pressure at least twice daily and record the readings.",
      "Review current medication for anticoagulant or antihypertensive \
       adjustment.",
      "Advise immediate smoking cessation and complete alcohol abstinence.",
      "Schedule a follow-up visit within two weeks to reassess vital signs.",
    ],
    RiskLabel::Low => [
      "Maintain a routine annual check-up schedule.",
      "Encourage at least 150 minutes of moderate physical activity per week.",
      "Promote a low-sodium diet rich in fruit and vegetables.",
      "Keep blood pressure and cholesterol within recommended ranges.",
      "Reinforce awareness of early stroke warning signs.",
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::features::FEATURE_COUNT;

  fn artifact_with_importances(importances: [f64; FEATURE_COUNT]) -> ClassifierArtifact {
    let names: Vec<String> =
      FEATURE_NAMES.iter().map(|n| (*n).to_owned()).collect();
    let raw = serde_json::json!({
      "feature_names": names,
      "importances": importances,
      "trees": [{ "nodes": [{ "kind": "leaf", "probability": 0.9 }] }]
    })
    .to_string();
    ClassifierArtifact::from_json_str(&raw).unwrap()
  }

  fn any_vector() -> FeatureVector {
    use chrono::{NaiveDate, Utc};
    use strokeguard_core::{
      patient::{
        ContactInfo, DocumentType, EmergencyContact, Patient,
        PatientRiskFactors, Sex,
      },
      visit::{
        Biometrics, Comorbidities, VisitNarrative, VisitRiskFactors, Visit,
        VitalSigns,
      },
    };
    use uuid::Uuid;

    let patient = Patient {
      patient_id:        Uuid::new_v4(),
      created_at:        Utc::now(),
      name:              "X".into(),
      document_type:     DocumentType::Cc,
      document:          "1".into(),
      birth_date:        NaiveDate::from_ymd_opt(1955, 3, 10).unwrap(),
      sex:               Sex::Female,
      contact:           ContactInfo::default(),
      emergency_contact: EmergencyContact::default(),
      risk_factors:      PatientRiskFactors::default(),
      prior_stroke:      false,
    };
    let visit = Visit {
      visit_id:      Uuid::new_v4(),
      patient_id:    patient.patient_id,
      visit_date:    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
      vitals:        VitalSigns {
        temperature:        Some(37.0),
        systolic_pressure:  165.0,
        diastolic_pressure: 95.0,
        heart_rate:         Some(88),
        respiratory_rate:   Some(18),
        arrhythmia:         true,
        notes:              None,
      },
      biometrics:    Biometrics::from_measurements(92.0, 1.6).unwrap(),
      risk_factors:  VisitRiskFactors {
        obesity: true,
        smoking: true,
        ..Default::default()
      },
      comorbidities: Comorbidities::default(),
      narrative:     VisitNarrative::default(),
      stroke_event:  false,
    };
    FeatureVector::from_latest_visit(&patient, &visit)
  }

  #[test]
  fn low_risk_yields_no_features() {
    let artifact = artifact_with_importances([0.1; FEATURE_COUNT]);
    let features = top_features(&artifact, &any_vector(), RiskLabel::Low);
    assert!(features.is_empty());
  }

  #[test]
  fn high_risk_yields_at_most_five_sorted_descending() {
    let mut importances = [0.01; FEATURE_COUNT];
    importances[3] = 0.30; // systolic_pressure
    importances[9] = 0.25; // bmi
    importances[0] = 0.20; // age
    importances[10] = 0.15; // arrhythmia
    importances[12] = 0.10; // smoking
    importances[4] = 0.05; // diastolic_pressure
    let artifact = artifact_with_importances(importances);

    let features = top_features(&artifact, &any_vector(), RiskLabel::High);
    assert_eq!(features.len(), 5);
    assert_eq!(features[0].feature, "systolic_pressure");
    assert_eq!(features[1].feature, "bmi");
    assert_eq!(features[2].feature, "age");
    assert_eq!(features[3].feature, "arrhythmia");
    assert_eq!(features[4].feature, "smoking");
    assert!(features.windows(2).all(|w| w[0].weight >= w[1].weight));
  }

  #[test]
  fn ties_keep_schema_order() {
    // All weights equal: the top five must be the first five allow-listed
    // features in schema order.
    let artifact = artifact_with_importances([0.05; FEATURE_COUNT]);
    let features = top_features(&artifact, &any_vector(), RiskLabel::High);
    let names: Vec<&str> =
      features.iter().map(|f| f.feature.as_str()).collect();
    assert_eq!(
      names,
      ["age", "temperature", "systolic_pressure", "diastolic_pressure", "heart_rate"]
    );
  }

  #[test]
  fn sex_and_trend_features_are_never_explained() {
    // Give the excluded features overwhelming weight; they still must not
    // surface.
    let mut importances = [0.0; FEATURE_COUNT];
    importances[1] = 0.9; // sex
    importances[18] = 0.8; // pressure_delta
    importances[19] = 0.7; // visits_last_year
    importances[20] = 0.6; // heart_rate_std_last_year
    importances[0] = 0.1; // age
    let artifact = artifact_with_importances(importances);

    let features = top_features(&artifact, &any_vector(), RiskLabel::High);
    assert!(features.iter().all(|f| {
      !["sex", "pressure_delta", "visits_last_year", "heart_rate_std_last_year"]
        .contains(&f.feature.as_str())
    }));
    assert_eq!(features[0].feature, "age");
  }

  #[test]
  fn recommendations_differ_by_label() {
    assert_ne!(
      recommendations(RiskLabel::High),
      recommendations(RiskLabel::Low)
    );
    assert_eq!(recommendations(RiskLabel::High).len(), 5);
    assert_eq!(recommendations(RiskLabel::Low).len(), 5);
  }
}
