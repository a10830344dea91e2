//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `strokeguard-store-sqlite`). Higher layers (`strokeguard-api`) depend on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  account::{NewAccount, UserAccount},
  appointment::{Appointment, NewAppointment},
  patient::{NewPatient, Patient},
  visit::{NewVisit, Visit},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Optional date-range filter for [`RecordStore::list_visits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitDateRange {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// One month of stroke-event counts, as returned by
/// [`RecordStore::monthly_stroke_events`]. Months with no visits at all are
/// absent; the reporter zero-fills the trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
  /// `YYYY-MM`.
  pub month:         String,
  pub stroke_events: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a clinical record store backend.
///
/// Writes are single-row upserts; the backend is expected to serialise
/// conflicting writes itself. All methods return `Send` futures so the trait
/// can be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Patients ──────────────────────────────────────────────────────────

  /// Create and persist a new patient. Fails with a duplicate-document
  /// error when the document number is already registered.
  fn add_patient(
    &self,
    input: NewPatient,
  ) -> impl Future<Output = Result<Patient, Self::Error>> + Send + '_;

  /// Retrieve a patient by id. Returns `None` if not found.
  fn get_patient(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + '_;

  /// Look up a patient by document number.
  fn find_patient_by_document<'a>(
    &'a self,
    document: &'a str,
  ) -> impl Future<Output = Result<Option<Patient>, Self::Error>> + Send + 'a;

  /// List all patients, ordered by registration time.
  fn list_patients(
    &self,
  ) -> impl Future<Output = Result<Vec<Patient>, Self::Error>> + Send + '_;

  /// Persist a full replacement row for an existing patient.
  fn update_patient<'a>(
    &'a self,
    patient: &'a Patient,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete a patient and, by cascade, their visits and appointments.
  /// Returns `false` if the patient did not exist.
  fn delete_patient(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Visits ────────────────────────────────────────────────────────────

  /// Record a new visit; the BMI is derived from weight/height.
  fn add_visit(
    &self,
    input: NewVisit,
  ) -> impl Future<Output = Result<Visit, Self::Error>> + Send + '_;

  fn get_visit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  /// List visits across all patients, newest first, optionally restricted
  /// to a date range.
  fn list_visits(
    &self,
    range: VisitDateRange,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  /// All visits for one patient, newest first (date, then insertion order).
  fn visits_for_patient(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Visit>, Self::Error>> + Send + '_;

  /// The patient's most recent visit, or `None` when they have no history.
  fn latest_visit(
    &self,
    patient_id: Uuid,
  ) -> impl Future<Output = Result<Option<Visit>, Self::Error>> + Send + '_;

  /// Persist a full replacement row for an existing visit.
  fn update_visit<'a>(
    &'a self,
    visit: &'a Visit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if the visit did not exist.
  fn delete_visit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Appointments ──────────────────────────────────────────────────────

  fn add_appointment(
    &self,
    input: NewAppointment,
  ) -> impl Future<Output = Result<Appointment, Self::Error>> + Send + '_;

  fn get_appointment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  /// All appointments, chronological.
  fn list_appointments(
    &self,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  /// Appointments scheduled on one calendar day, chronological.
  fn appointments_on(
    &self,
    day: NaiveDate,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  /// Persist a full replacement row for an existing appointment.
  fn update_appointment<'a>(
    &'a self,
    appointment: &'a Appointment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Returns `false` if the appointment did not exist.
  fn delete_appointment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create a login account. Fails with a duplicate-username error when the
  /// username is already taken.
  fn add_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<UserAccount, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + '_;

  fn find_account_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<UserAccount>, Self::Error>> + Send + 'a;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn count_patients(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Total stroke events ever recorded across all visits.
  fn count_stroke_events(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Stroke-event counts grouped by calendar month (`YYYY-MM`, ascending)
  /// for visits dated on or after `since`.
  fn monthly_stroke_events(
    &self,
    since: NaiveDate,
  ) -> impl Future<Output = Result<Vec<MonthlyCount>, Self::Error>> + Send + '_;
}
