//! Handlers for `/risk` endpoints: single-patient prediction and the
//! population listing.

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Serialize;
use strokeguard_core::store::RecordStore;
use strokeguard_risk::{RISK_THRESHOLD, RiskLabel, explain::FeatureContribution};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── Single patient ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
  pub patient_id:           Uuid,
  pub probability:          f64,
  pub risk:                 RiskLabel,
  pub context:              String,
  pub explanatory_features: Vec<FeatureContribution>,
  pub recommendations:      Vec<String>,
}

/// `GET /risk/patients/:id` — 404 when the patient does not exist or has no
/// visit history.
pub async fn predict<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(patient_id): Path<Uuid>,
) -> Result<Json<PredictionResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patient = state
    .store
    .get_patient(patient_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("patient not found".into()))?;

  let visit = state
    .store
    .latest_visit(patient_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("patient has no visit history".into()))?;

  let assessment = state.scorer.assess(&patient, &visit);
  Ok(Json(PredictionResponse {
    patient_id,
    probability: assessment.probability,
    risk: assessment.risk,
    context: assessment.context,
    explanatory_features: assessment.explanatory_features,
    recommendations: assessment.recommendations,
  }))
}

// ─── Population listing ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RiskListEntry {
  pub patient_id:  Uuid,
  pub name:        String,
  pub probability: f64,
}

/// High risk sorted by probability descending, low risk ascending.
#[derive(Debug, Serialize)]
pub struct RiskListResponse {
  pub high_risk: Vec<RiskListEntry>,
  pub low_risk:  Vec<RiskListEntry>,
}

/// `GET /risk/patients` — scores every patient with at least one visit.
///
/// A sequential scan: fine at the clinic's scale of hundreds of patients,
/// would need chunking well beyond that. Patients whose scoring fails are
/// skipped, not fatal for the listing.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<RiskListResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patients = state.store.list_patients().await.map_err(ApiError::store)?;

  let mut high_risk = Vec::new();
  let mut low_risk = Vec::new();

  for patient in patients {
    let visit = match state.store.latest_visit(patient.patient_id).await {
      Ok(Some(visit)) => visit,
      Ok(None) => continue,
      Err(e) => {
        tracing::warn!(
          patient_id = %patient.patient_id,
          error = %e,
          "skipping patient in risk listing"
        );
        continue;
      }
    };

    let probability = state.scorer.probability(&patient, &visit);
    let entry = RiskListEntry {
      patient_id: patient.patient_id,
      name: patient.name,
      probability,
    };
    if probability >= RISK_THRESHOLD {
      high_risk.push(entry);
    } else {
      low_risk.push(entry);
    }
  }

  high_risk.sort_by(|a, b| {
    b.probability
      .partial_cmp(&a.probability)
      .unwrap_or(std::cmp::Ordering::Equal)
  });
  low_risk.sort_by(|a, b| {
    a.probability
      .partial_cmp(&b.probability)
      .unwrap_or(std::cmp::Ordering::Equal)
  });

  Ok(Json(RiskListResponse { high_risk, low_risk }))
}
