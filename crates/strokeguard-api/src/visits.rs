//! Handlers for `/visits` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/visits` | Optional `?from=YYYY-MM-DD&to=YYYY-MM-DD` |
//! | `POST`   | `/visits` | 404 when the patient does not exist |
//! | `GET`    | `/visits/:id` | |
//! | `PUT`    | `/visits/:id` | Partial body; BMI recomputed on weight/height change |
//! | `DELETE` | `/visits/:id` | |
//! | `GET`    | `/visits/patient/:id` | Light summary rows, newest first |
//! | `GET`    | `/visits/patient/:id/summary` | Averages and frequent conditions |

use std::collections::HashMap;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use strokeguard_core::{
  store::{RecordStore, VisitDateRange},
  visit::{
    Biometrics, Comorbidities, NewVisit, Visit, VisitNarrative,
    VisitRiskFactors, VitalSigns,
  },
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, ApiJson},
  validate::{FieldErrors, check_not_future, require_positive},
};

fn validate_visit_fields(
  visit_date: NaiveDate,
  vitals: &VitalSigns,
  weight: f64,
  height: f64,
) -> Result<(), ApiError> {
  let mut errors = FieldErrors::new();
  check_not_future(&mut errors, "visit_date", visit_date, Utc::now().date_naive());
  require_positive(&mut errors, "vitals.systolic_pressure", vitals.systolic_pressure);
  require_positive(&mut errors, "vitals.diastolic_pressure", vitals.diastolic_pressure);
  require_positive(&mut errors, "weight", weight);
  require_positive(&mut errors, "height", height);
  errors.into_result()
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /visits[?from=...][&to=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Visit>>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let range = VisitDateRange { from: params.from, to: params.to };
  let visits = state.store.list_visits(range).await.map_err(ApiError::store)?;
  Ok(Json(visits))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateVisitBody {
  pub patient_id:    Uuid,
  pub visit_date:    NaiveDate,
  pub vitals:        VitalSigns,
  pub weight:        f64,
  pub height:        f64,
  #[serde(default)]
  pub risk_factors:  VisitRiskFactors,
  #[serde(default)]
  pub comorbidities: Comorbidities,
  #[serde(default)]
  pub narrative:     VisitNarrative,
  #[serde(default)]
  pub stroke_event:  bool,
}

/// `POST /visits` — 201 with the stored visit (BMI derived by the store).
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  ApiJson(body): ApiJson<CreateVisitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  validate_visit_fields(body.visit_date, &body.vitals, body.weight, body.height)?;

  if state
    .store
    .get_patient(body.patient_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound("patient not found".into()));
  }

  let visit = state
    .store
    .add_visit(NewVisit {
      patient_id:    body.patient_id,
      visit_date:    body.visit_date,
      vitals:        body.vitals,
      weight:        body.weight,
      height:        body.height,
      risk_factors:  body.risk_factors,
      comorbidities: body.comorbidities,
      narrative:     body.narrative,
      stroke_event:  body.stroke_event,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(visit)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /visits/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Visit>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let visit = state
    .store
    .get_visit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("visit not found".into()))?;
  Ok(Json(visit))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Partial update body: omitted fields keep their stored value. Changing
/// weight or height recomputes the BMI.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVisitBody {
  pub visit_date:    Option<NaiveDate>,
  pub vitals:        Option<VitalSigns>,
  pub weight:        Option<f64>,
  pub height:        Option<f64>,
  pub risk_factors:  Option<VisitRiskFactors>,
  pub comorbidities: Option<Comorbidities>,
  pub narrative:     Option<VisitNarrative>,
  pub stroke_event:  Option<bool>,
}

/// `PUT /visits/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<UpdateVisitBody>,
) -> Result<Json<Visit>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut visit = state
    .store
    .get_visit(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("visit not found".into()))?;

  if let Some(visit_date) = body.visit_date {
    visit.visit_date = visit_date;
  }
  if let Some(vitals) = body.vitals {
    visit.vitals = vitals;
  }
  let weight = body.weight.unwrap_or(visit.biometrics.weight);
  let height = body.height.unwrap_or(visit.biometrics.height);
  if let Some(risk_factors) = body.risk_factors {
    visit.risk_factors = risk_factors;
  }
  if let Some(comorbidities) = body.comorbidities {
    visit.comorbidities = comorbidities;
  }
  if let Some(narrative) = body.narrative {
    visit.narrative = narrative;
  }
  if let Some(stroke_event) = body.stroke_event {
    visit.stroke_event = stroke_event;
  }

  validate_visit_fields(visit.visit_date, &visit.vitals, weight, height)?;
  // Positive measurements were just validated.
  visit.biometrics = Biometrics::from_measurements(weight, height)
    .map_err(|e| ApiError::Internal(e.to_string()))?;

  state.store.update_visit(&visit).await.map_err(ApiError::store)?;
  Ok(Json(visit))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /visits/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state.store.delete_visit(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound("visit not found".into()));
  }
  Ok(Json(json!({ "message": "visit deleted" })))
}

// ─── Per-patient listing ──────────────────────────────────────────────────────

/// One row of the light per-patient listing.
#[derive(Debug, Serialize)]
pub struct VisitSummaryRow {
  pub visit_id:   Uuid,
  pub visit_date: NaiveDate,
  pub reason:     Option<String>,
  pub bmi:        f64,
}

/// `GET /visits/patient/:id` — newest first; empty for unknown patients.
pub async fn for_patient<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<VisitSummaryRow>>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let visits = state
    .store
    .visits_for_patient(patient_id)
    .await
    .map_err(ApiError::store)?;

  let rows = visits
    .into_iter()
    .map(|v| VisitSummaryRow {
      visit_id:   v.visit_id,
      visit_date: v.visit_date,
      reason:     v.narrative.reason,
      bmi:        v.biometrics.bmi,
    })
    .collect();
  Ok(Json(rows))
}

// ─── Clinical summary ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FrequentEntry {
  pub value: String,
  pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PatientSummary {
  pub total_visits:           usize,
  pub avg_temperature:        f64,
  pub avg_heart_rate:         f64,
  pub avg_respiratory_rate:   f64,
  pub avg_bmi:                f64,
  /// Up to 3 most frequent prior conditions across all visits.
  pub frequent_conditions:    Vec<FrequentEntry>,
  /// Up to 3 most frequent visit reasons.
  pub frequent_reasons:       Vec<FrequentEntry>,
}

#[derive(Debug, Serialize)]
pub struct PatientSummaryResponse {
  pub visits:  Vec<Visit>,
  pub summary: PatientSummary,
}

fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Count occurrences and keep the top 3 (ties broken alphabetically so the
/// output is deterministic).
fn most_common(values: impl Iterator<Item = String>) -> Vec<FrequentEntry> {
  let mut counts: HashMap<String, usize> = HashMap::new();
  for value in values {
    *counts.entry(value).or_insert(0) += 1;
  }
  let mut entries: Vec<FrequentEntry> = counts
    .into_iter()
    .map(|(value, count)| FrequentEntry { value, count })
    .collect();
  entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value)));
  entries.truncate(3);
  entries
}

/// `GET /visits/patient/:id/summary` — 404 when the patient has no visits.
pub async fn patient_summary<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(patient_id): Path<Uuid>,
) -> Result<Json<PatientSummaryResponse>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let visits = state
    .store
    .visits_for_patient(patient_id)
    .await
    .map_err(ApiError::store)?;

  if visits.is_empty() {
    return Err(ApiError::NotFound("no visits for this patient".into()));
  }

  let total = visits.len();
  let sum_temperature: f64 =
    visits.iter().filter_map(|v| v.vitals.temperature).sum();
  let sum_heart_rate: f64 = visits
    .iter()
    .filter_map(|v| v.vitals.heart_rate)
    .map(f64::from)
    .sum();
  let sum_respiratory: f64 = visits
    .iter()
    .filter_map(|v| v.vitals.respiratory_rate)
    .map(f64::from)
    .sum();
  let sum_bmi: f64 = visits.iter().map(|v| v.biometrics.bmi).sum();

  let conditions = visits.iter().flat_map(|v| {
    v.narrative
      .prior_conditions
      .as_deref()
      .unwrap_or("")
      .split(',')
      .map(|c| c.trim().to_lowercase())
      .filter(|c| !c.is_empty())
      .collect::<Vec<_>>()
  });
  let reasons = visits
    .iter()
    .filter_map(|v| v.narrative.reason.as_deref())
    .map(|r| r.trim().to_lowercase())
    .filter(|r| !r.is_empty());

  let summary = PatientSummary {
    total_visits:         total,
    avg_temperature:      round2(sum_temperature / total as f64),
    avg_heart_rate:       round2(sum_heart_rate / total as f64),
    avg_respiratory_rate: round2(sum_respiratory / total as f64),
    avg_bmi:              round2(sum_bmi / total as f64),
    frequent_conditions:  most_common(conditions),
    frequent_reasons:     most_common(reasons),
  };

  Ok(Json(PatientSummaryResponse { visits, summary }))
}
