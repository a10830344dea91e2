//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! dates, UUIDs as hyphenated lowercase strings, booleans as INTEGER 0/1.

use chrono::{DateTime, NaiveDate, Utc};
use strokeguard_core::{
  account::UserAccount,
  appointment::{Appointment, AppointmentStatus},
  patient::{
    ContactInfo, DocumentType, EmergencyContact, Patient, PatientRiskFactors,
    Sex,
  },
  visit::{
    Biometrics, Comorbidities, VisitNarrative, VisitRiskFactors, Visit,
    VitalSigns,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates and timestamps ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_sex(s: Sex) -> &'static str {
  match s {
    Sex::Male => "M",
    Sex::Female => "F",
  }
}

pub fn decode_sex(s: &str) -> Result<Sex> {
  match s {
    "M" => Ok(Sex::Male),
    "F" => Ok(Sex::Female),
    other => Err(Error::Decode(format!("unknown sex: {other:?}"))),
  }
}

pub fn encode_document_type(t: DocumentType) -> &'static str {
  match t {
    DocumentType::Cc => "CC",
    DocumentType::Ti => "TI",
    DocumentType::Ce => "CE",
  }
}

pub fn decode_document_type(s: &str) -> Result<DocumentType> {
  match s {
    "CC" => Ok(DocumentType::Cc),
    "TI" => Ok(DocumentType::Ti),
    "CE" => Ok(DocumentType::Ce),
    other => Err(Error::Decode(format!("unknown document type: {other:?}"))),
  }
}

pub fn encode_status(s: AppointmentStatus) -> &'static str {
  match s {
    AppointmentStatus::Awaiting => "awaiting",
    AppointmentStatus::Arrived => "arrived",
    AppointmentStatus::Completed => "completed",
    AppointmentStatus::Cancelled => "cancelled",
  }
}

pub fn decode_status(s: &str) -> Result<AppointmentStatus> {
  match s {
    "awaiting" => Ok(AppointmentStatus::Awaiting),
    "arrived" => Ok(AppointmentStatus::Arrived),
    "completed" => Ok(AppointmentStatus::Completed),
    "cancelled" => Ok(AppointmentStatus::Cancelled),
    other => Err(Error::Decode(format!("unknown appointment status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `patients` row, in column order.
pub struct RawPatient {
  pub patient_id:             String,
  pub created_at:             String,
  pub name:                   String,
  pub document_type:          String,
  pub document:               String,
  pub birth_date:             String,
  pub sex:                    String,
  pub phone:                  Option<String>,
  pub address:                Option<String>,
  pub email:                  Option<String>,
  pub marital_status:         Option<String>,
  pub occupation:             Option<String>,
  pub blood_type:             Option<String>,
  pub insurer:                Option<String>,
  pub emergency_name:         Option<String>,
  pub emergency_phone:        Option<String>,
  pub emergency_relationship: Option<String>,
  pub hypertension:           bool,
  pub diabetes:               bool,
  pub smoking:                bool,
  pub sedentary:              bool,
  pub high_cholesterol:       bool,
  pub family_stroke_history:  bool,
  pub prior_stroke:           bool,
}

impl RawPatient {
  /// Column list matching the field order above.
  pub const COLUMNS: &'static str = "patient_id, created_at, name, \
     document_type, document, birth_date, sex, phone, address, email, \
     marital_status, occupation, blood_type, insurer, emergency_name, \
     emergency_phone, emergency_relationship, hypertension, diabetes, \
     smoking, sedentary, high_cholesterol, family_stroke_history, \
     prior_stroke";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      patient_id:             row.get(0)?,
      created_at:             row.get(1)?,
      name:                   row.get(2)?,
      document_type:          row.get(3)?,
      document:               row.get(4)?,
      birth_date:             row.get(5)?,
      sex:                    row.get(6)?,
      phone:                  row.get(7)?,
      address:                row.get(8)?,
      email:                  row.get(9)?,
      marital_status:         row.get(10)?,
      occupation:             row.get(11)?,
      blood_type:             row.get(12)?,
      insurer:                row.get(13)?,
      emergency_name:         row.get(14)?,
      emergency_phone:        row.get(15)?,
      emergency_relationship: row.get(16)?,
      hypertension:           row.get(17)?,
      diabetes:               row.get(18)?,
      smoking:                row.get(19)?,
      sedentary:              row.get(20)?,
      high_cholesterol:       row.get(21)?,
      family_stroke_history:  row.get(22)?,
      prior_stroke:           row.get(23)?,
    })
  }

  pub fn into_patient(self) -> Result<Patient> {
    Ok(Patient {
      patient_id:        decode_uuid(&self.patient_id)?,
      created_at:        decode_dt(&self.created_at)?,
      name:              self.name,
      document_type:     decode_document_type(&self.document_type)?,
      document:          self.document,
      birth_date:        decode_date(&self.birth_date)?,
      sex:               decode_sex(&self.sex)?,
      contact:           ContactInfo {
        phone:          self.phone,
        address:        self.address,
        email:          self.email,
        marital_status: self.marital_status,
        occupation:     self.occupation,
        blood_type:     self.blood_type,
        insurer:        self.insurer,
      },
      emergency_contact: EmergencyContact {
        name:         self.emergency_name,
        phone:        self.emergency_phone,
        relationship: self.emergency_relationship,
      },
      risk_factors:      PatientRiskFactors {
        hypertension:          self.hypertension,
        diabetes:              self.diabetes,
        smoking:               self.smoking,
        sedentary:             self.sedentary,
        high_cholesterol:      self.high_cholesterol,
        family_stroke_history: self.family_stroke_history,
      },
      prior_stroke:      self.prior_stroke,
    })
  }
}

/// Raw values read directly from a `visits` row, in column order.
pub struct RawVisit {
  pub visit_id:              String,
  pub patient_id:            String,
  pub visit_date:            String,
  pub temperature:           Option<f64>,
  pub systolic_pressure:     f64,
  pub diastolic_pressure:    f64,
  pub heart_rate:            Option<u32>,
  pub respiratory_rate:      Option<u32>,
  pub arrhythmia:            bool,
  pub vitals_notes:          Option<String>,
  pub weight:                f64,
  pub height:                f64,
  pub bmi:                   f64,
  pub obesity:               bool,
  pub smoking:               bool,
  pub alcohol:               bool,
  pub stimulant_use:         bool,
  pub sedentary:             bool,
  pub prior_cardiac_disease: bool,
  pub stress:                bool,
  pub family_stroke_history: bool,
  pub hypertension:          bool,
  pub diabetes:              bool,
  pub reason:                Option<String>,
  pub symptom_onset:         Option<String>,
  pub prior_conditions:      Option<String>,
  pub family_history:        Option<String>,
  pub medications:           Option<String>,
  pub diagnosis:             Option<String>,
  pub stroke_event:          bool,
}

impl RawVisit {
  pub const COLUMNS: &'static str = "visit_id, patient_id, visit_date, \
     temperature, systolic_pressure, diastolic_pressure, heart_rate, \
     respiratory_rate, arrhythmia, vitals_notes, weight, height, bmi, \
     obesity, smoking, alcohol, stimulant_use, sedentary, \
     prior_cardiac_disease, stress, family_stroke_history, hypertension, \
     diabetes, reason, symptom_onset, prior_conditions, family_history, \
     medications, diagnosis, stroke_event";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visit_id:              row.get(0)?,
      patient_id:            row.get(1)?,
      visit_date:            row.get(2)?,
      temperature:           row.get(3)?,
      systolic_pressure:     row.get(4)?,
      diastolic_pressure:    row.get(5)?,
      heart_rate:            row.get(6)?,
      respiratory_rate:      row.get(7)?,
      arrhythmia:            row.get(8)?,
      vitals_notes:          row.get(9)?,
      weight:                row.get(10)?,
      height:                row.get(11)?,
      bmi:                   row.get(12)?,
      obesity:               row.get(13)?,
      smoking:               row.get(14)?,
      alcohol:               row.get(15)?,
      stimulant_use:         row.get(16)?,
      sedentary:             row.get(17)?,
      prior_cardiac_disease: row.get(18)?,
      stress:                row.get(19)?,
      family_stroke_history: row.get(20)?,
      hypertension:          row.get(21)?,
      diabetes:              row.get(22)?,
      reason:                row.get(23)?,
      symptom_onset:         row.get(24)?,
      prior_conditions:      row.get(25)?,
      family_history:        row.get(26)?,
      medications:           row.get(27)?,
      diagnosis:             row.get(28)?,
      stroke_event:          row.get(29)?,
    })
  }

  pub fn into_visit(self) -> Result<Visit> {
    Ok(Visit {
      visit_id:      decode_uuid(&self.visit_id)?,
      patient_id:    decode_uuid(&self.patient_id)?,
      visit_date:    decode_date(&self.visit_date)?,
      vitals:        VitalSigns {
        temperature:        self.temperature,
        systolic_pressure:  self.systolic_pressure,
        diastolic_pressure: self.diastolic_pressure,
        heart_rate:         self.heart_rate,
        respiratory_rate:   self.respiratory_rate,
        arrhythmia:         self.arrhythmia,
        notes:              self.vitals_notes,
      },
      biometrics:    Biometrics {
        weight: self.weight,
        height: self.height,
        bmi:    self.bmi,
      },
      risk_factors:  VisitRiskFactors {
        obesity:               self.obesity,
        smoking:               self.smoking,
        alcohol:               self.alcohol,
        stimulant_use:         self.stimulant_use,
        sedentary:             self.sedentary,
        prior_cardiac_disease: self.prior_cardiac_disease,
        stress:                self.stress,
        family_stroke_history: self.family_stroke_history,
      },
      comorbidities: Comorbidities {
        hypertension: self.hypertension,
        diabetes:     self.diabetes,
      },
      narrative:     VisitNarrative {
        reason:           self.reason,
        symptom_onset:    self
          .symptom_onset
          .as_deref()
          .map(decode_date)
          .transpose()?,
        prior_conditions: self.prior_conditions,
        family_history:   self.family_history,
        medications:      self.medications,
        diagnosis:        self.diagnosis,
      },
      stroke_event:  self.stroke_event,
    })
  }
}

/// Raw values read directly from an `appointments` row, in column order.
pub struct RawAppointment {
  pub appointment_id: String,
  pub patient_id:     String,
  pub scheduled_at:   String,
  pub service:        String,
  pub staff_name:     Option<String>,
  pub status:         String,
  pub notes:          Option<String>,
}

impl RawAppointment {
  pub const COLUMNS: &'static str = "appointment_id, patient_id, \
     scheduled_at, service, staff_name, status, notes";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      appointment_id: row.get(0)?,
      patient_id:     row.get(1)?,
      scheduled_at:   row.get(2)?,
      service:        row.get(3)?,
      staff_name:     row.get(4)?,
      status:         row.get(5)?,
      notes:          row.get(6)?,
    })
  }

  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      appointment_id: decode_uuid(&self.appointment_id)?,
      patient_id:     decode_uuid(&self.patient_id)?,
      scheduled_at:   decode_dt(&self.scheduled_at)?,
      service:        self.service,
      staff_name:     self.staff_name,
      status:         decode_status(&self.status)?,
      notes:          self.notes,
    })
  }
}

/// Raw values read directly from an `accounts` row, in column order.
pub struct RawAccount {
  pub account_id:    String,
  pub created_at:    String,
  pub name:          String,
  pub username:      String,
  pub password_hash: String,
}

impl RawAccount {
  pub const COLUMNS: &'static str =
    "account_id, created_at, name, username, password_hash";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      created_at:    row.get(1)?,
      name:          row.get(2)?,
      username:      row.get(3)?,
      password_hash: row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<UserAccount> {
    Ok(UserAccount {
      account_id:    decode_uuid(&self.account_id)?,
      created_at:    decode_dt(&self.created_at)?,
      name:          self.name,
      username:      self.username,
      password_hash: self.password_hash,
    })
  }
}
