//! Handlers for `/patients` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/patients` | All patients |
//! | `POST`   | `/patients` | 400 on duplicate document |
//! | `GET`    | `/patients/:id` | 404 if not found |
//! | `PUT`    | `/patients/:id` | Partial body; omitted fields keep their value |
//! | `DELETE` | `/patients/:id` | Cascades to visits and appointments |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use strokeguard_core::{
  patient::{
    ContactInfo, DocumentType, EmergencyContact, NewPatient, Patient,
    PatientRiskFactors, Sex,
  },
  store::RecordStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, ApiJson},
  validate::{
    FieldErrors, check_email, check_not_future, check_phone, require_digits,
    require_non_empty,
  },
};

fn validate_patient_fields(
  name: &str,
  document: &str,
  birth_date: NaiveDate,
  contact: &ContactInfo,
  emergency: &EmergencyContact,
) -> Result<(), ApiError> {
  let mut errors = FieldErrors::new();
  require_non_empty(&mut errors, "name", name);
  require_digits(&mut errors, "document", document);
  check_not_future(&mut errors, "birth_date", birth_date, Utc::now().date_naive());
  check_phone(&mut errors, "contact.phone", contact.phone.as_deref());
  check_email(&mut errors, "contact.email", contact.email.as_deref());
  check_phone(
    &mut errors,
    "emergency_contact.phone",
    emergency.phone.as_deref(),
  );
  errors.into_result()
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /patients`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Patient>>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patients = state.store.list_patients().await.map_err(ApiError::store)?;
  Ok(Json(patients))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePatientBody {
  pub name:              String,
  pub document_type:     DocumentType,
  pub document:          String,
  pub birth_date:        NaiveDate,
  pub sex:               Sex,
  #[serde(default)]
  pub contact:           ContactInfo,
  #[serde(default)]
  pub emergency_contact: EmergencyContact,
  #[serde(default)]
  pub risk_factors:      PatientRiskFactors,
  #[serde(default)]
  pub prior_stroke:      bool,
}

/// `POST /patients` — 201 with the stored patient, or 400 when the document
/// number is already registered (nothing is inserted).
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  ApiJson(body): ApiJson<CreatePatientBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  validate_patient_fields(
    &body.name,
    &body.document,
    body.birth_date,
    &body.contact,
    &body.emergency_contact,
  )?;

  if state
    .store
    .find_patient_by_document(&body.document)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest(
      "the document is already registered".into(),
    ));
  }

  let patient = state
    .store
    .add_patient(NewPatient {
      name:              body.name,
      document_type:     body.document_type,
      document:          body.document,
      birth_date:        body.birth_date,
      sex:               body.sex,
      contact:           body.contact,
      emergency_contact: body.emergency_contact,
      risk_factors:      body.risk_factors,
      prior_stroke:      body.prior_stroke,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(patient)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /patients/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let patient = state
    .store
    .get_patient(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("patient not found".into()))?;
  Ok(Json(patient))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Partial update body: omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePatientBody {
  pub name:              Option<String>,
  pub document_type:     Option<DocumentType>,
  pub document:          Option<String>,
  pub birth_date:        Option<NaiveDate>,
  pub sex:               Option<Sex>,
  pub contact:           Option<ContactInfo>,
  pub emergency_contact: Option<EmergencyContact>,
  pub risk_factors:      Option<PatientRiskFactors>,
  pub prior_stroke:      Option<bool>,
}

impl UpdatePatientBody {
  fn apply(self, patient: &mut Patient) {
    if let Some(name) = self.name {
      patient.name = name;
    }
    if let Some(document_type) = self.document_type {
      patient.document_type = document_type;
    }
    if let Some(document) = self.document {
      patient.document = document;
    }
    if let Some(birth_date) = self.birth_date {
      patient.birth_date = birth_date;
    }
    if let Some(sex) = self.sex {
      patient.sex = sex;
    }
    if let Some(contact) = self.contact {
      patient.contact = contact;
    }
    if let Some(emergency_contact) = self.emergency_contact {
      patient.emergency_contact = emergency_contact;
    }
    if let Some(risk_factors) = self.risk_factors {
      patient.risk_factors = risk_factors;
    }
    if let Some(prior_stroke) = self.prior_stroke {
      patient.prior_stroke = prior_stroke;
    }
  }
}

/// `PUT /patients/:id` — read-modify-write with validation on the merged
/// record.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<UpdatePatientBody>,
) -> Result<Json<Patient>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut patient = state
    .store
    .get_patient(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("patient not found".into()))?;

  body.apply(&mut patient);

  validate_patient_fields(
    &patient.name,
    &patient.document,
    patient.birth_date,
    &patient.contact,
    &patient.emergency_contact,
  )?;

  // A changed document must still be unique.
  if let Some(existing) = state
    .store
    .find_patient_by_document(&patient.document)
    .await
    .map_err(ApiError::store)?
    && existing.patient_id != patient.patient_id
  {
    return Err(ApiError::BadRequest(
      "the document is already registered".into(),
    ));
  }

  state
    .store
    .update_patient(&patient)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(patient))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /patients/:id` — removes the patient and, by cascade, their
/// visits and appointments.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state.store.delete_patient(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound("patient not found".into()));
  }
  Ok(Json(json!({ "message": "patient deleted" })))
}
