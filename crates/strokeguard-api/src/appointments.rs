//! Handlers for `/appointments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/appointments` | All appointments, chronological |
//! | `GET`    | `/appointments/today` | Today's slots |
//! | `POST`   | `/appointments` | 404 when the patient does not exist |
//! | `GET`    | `/appointments/:id` | |
//! | `PUT`    | `/appointments/:id` | Partial body, e.g. `{"status":"arrived"}` |
//! | `DELETE` | `/appointments/:id` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use strokeguard_core::{
  appointment::{Appointment, AppointmentStatus, NewAppointment},
  store::RecordStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, ApiJson},
  validate::{FieldErrors, require_non_empty},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /appointments`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let appointments =
    state.store.list_appointments().await.map_err(ApiError::store)?;
  Ok(Json(appointments))
}

/// `GET /appointments/today`
pub async fn today<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Appointment>>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let appointments = state
    .store
    .appointments_on(Utc::now().date_naive())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(appointments))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentBody {
  pub patient_id:   Uuid,
  pub scheduled_at: DateTime<Utc>,
  pub service:      String,
  pub staff_name:   Option<String>,
  #[serde(default)]
  pub status:       AppointmentStatus,
  pub notes:        Option<String>,
}

/// `POST /appointments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  ApiJson(body): ApiJson<CreateAppointmentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut errors = FieldErrors::new();
  require_non_empty(&mut errors, "service", &body.service);
  errors.into_result()?;

  if state
    .store
    .get_patient(body.patient_id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::NotFound("patient not found".into()));
  }

  let appointment = state
    .store
    .add_appointment(NewAppointment {
      patient_id:   body.patient_id,
      scheduled_at: body.scheduled_at,
      service:      body.service,
      staff_name:   body.staff_name,
      status:       body.status,
      notes:        body.notes,
    })
    .await
    .map_err(ApiError::store)?;

  Ok((StatusCode::CREATED, Json(appointment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /appointments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let appointment = state
    .store
    .get_appointment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;
  Ok(Json(appointment))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Partial update body — the front desk usually sends just
/// `{"status":"arrived"}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAppointmentBody {
  pub scheduled_at: Option<DateTime<Utc>>,
  pub service:      Option<String>,
  pub staff_name:   Option<String>,
  pub status:       Option<AppointmentStatus>,
  pub notes:        Option<String>,
}

/// `PUT /appointments/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  ApiJson(body): ApiJson<UpdateAppointmentBody>,
) -> Result<Json<Appointment>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut appointment = state
    .store
    .get_appointment(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("appointment not found".into()))?;

  if let Some(scheduled_at) = body.scheduled_at {
    appointment.scheduled_at = scheduled_at;
  }
  if let Some(service) = body.service {
    appointment.service = service;
  }
  if let Some(staff_name) = body.staff_name {
    appointment.staff_name = Some(staff_name);
  }
  if let Some(status) = body.status {
    appointment.status = status;
  }
  if let Some(notes) = body.notes {
    appointment.notes = Some(notes);
  }

  let mut errors = FieldErrors::new();
  require_non_empty(&mut errors, "service", &appointment.service);
  errors.into_result()?;

  state
    .store
    .update_appointment(&appointment)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(appointment))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /appointments/:id`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted =
    state.store.delete_appointment(id).await.map_err(ApiError::store)?;
  if !deleted {
    return Err(ApiError::NotFound("appointment not found".into()));
  }
  Ok(Json(json!({ "message": "appointment deleted" })))
}
