//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use strokeguard_core::{
  account::{NewAccount, UserAccount},
  appointment::{Appointment, NewAppointment},
  patient::{NewPatient, Patient},
  store::{MonthlyCount, RecordStore, VisitDateRange},
  visit::{Biometrics, NewVisit, Visit},
};

use crate::{
  Error, Result,
  encode::{
    RawAccount, RawAppointment, RawPatient, RawVisit, encode_date, encode_dt,
    encode_document_type, encode_sex, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A clinical record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write all mutable columns of a patient row. Returns the number of
  /// affected rows.
  async fn write_patient_row(&self, patient: &Patient, insert: bool) -> Result<usize> {
    let p = patient.clone();
    let affected = self
      .conn
      .call(move |conn| {
        let params = rusqlite::params![
          encode_uuid(p.patient_id),
          encode_dt(p.created_at),
          p.name,
          encode_document_type(p.document_type),
          p.document,
          encode_date(p.birth_date),
          encode_sex(p.sex),
          p.contact.phone,
          p.contact.address,
          p.contact.email,
          p.contact.marital_status,
          p.contact.occupation,
          p.contact.blood_type,
          p.contact.insurer,
          p.emergency_contact.name,
          p.emergency_contact.phone,
          p.emergency_contact.relationship,
          p.risk_factors.hypertension,
          p.risk_factors.diabetes,
          p.risk_factors.smoking,
          p.risk_factors.sedentary,
          p.risk_factors.high_cholesterol,
          p.risk_factors.family_stroke_history,
          p.prior_stroke,
        ];
        let sql = if insert {
          "INSERT INTO patients (
             patient_id, created_at, name, document_type, document,
             birth_date, sex, phone, address, email, marital_status,
             occupation, blood_type, insurer, emergency_name,
             emergency_phone, emergency_relationship, hypertension,
             diabetes, smoking, sedentary, high_cholesterol,
             family_stroke_history, prior_stroke
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22,
                     ?23, ?24)"
        } else {
          "UPDATE patients SET
             created_at = ?2, name = ?3, document_type = ?4, document = ?5,
             birth_date = ?6, sex = ?7, phone = ?8, address = ?9,
             email = ?10, marital_status = ?11, occupation = ?12,
             blood_type = ?13, insurer = ?14, emergency_name = ?15,
             emergency_phone = ?16, emergency_relationship = ?17,
             hypertension = ?18, diabetes = ?19, smoking = ?20,
             sedentary = ?21, high_cholesterol = ?22,
             family_stroke_history = ?23, prior_stroke = ?24
           WHERE patient_id = ?1"
        };
        Ok(conn.execute(sql, params)?)
      })
      .await?;
    Ok(affected)
  }

  /// Write all mutable columns of a visit row. Returns the number of
  /// affected rows.
  async fn write_visit_row(&self, visit: &Visit, insert: bool) -> Result<usize> {
    let v = visit.clone();
    let affected = self
      .conn
      .call(move |conn| {
        let params = rusqlite::params![
          encode_uuid(v.visit_id),
          encode_uuid(v.patient_id),
          encode_date(v.visit_date),
          v.vitals.temperature,
          v.vitals.systolic_pressure,
          v.vitals.diastolic_pressure,
          v.vitals.heart_rate,
          v.vitals.respiratory_rate,
          v.vitals.arrhythmia,
          v.vitals.notes,
          v.biometrics.weight,
          v.biometrics.height,
          v.biometrics.bmi,
          v.risk_factors.obesity,
          v.risk_factors.smoking,
          v.risk_factors.alcohol,
          v.risk_factors.stimulant_use,
          v.risk_factors.sedentary,
          v.risk_factors.prior_cardiac_disease,
          v.risk_factors.stress,
          v.risk_factors.family_stroke_history,
          v.comorbidities.hypertension,
          v.comorbidities.diabetes,
          v.narrative.reason,
          v.narrative.symptom_onset.map(encode_date),
          v.narrative.prior_conditions,
          v.narrative.family_history,
          v.narrative.medications,
          v.narrative.diagnosis,
          v.stroke_event,
        ];
        let sql = if insert {
          "INSERT INTO visits (
             visit_id, patient_id, visit_date, temperature,
             systolic_pressure, diastolic_pressure, heart_rate,
             respiratory_rate, arrhythmia, vitals_notes, weight, height,
             bmi, obesity, smoking, alcohol, stimulant_use, sedentary,
             prior_cardiac_disease, stress, family_stroke_history,
             hypertension, diabetes, reason, symptom_onset,
             prior_conditions, family_history, medications, diagnosis,
             stroke_event
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22,
                     ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)"
        } else {
          "UPDATE visits SET
             patient_id = ?2, visit_date = ?3, temperature = ?4,
             systolic_pressure = ?5, diastolic_pressure = ?6,
             heart_rate = ?7, respiratory_rate = ?8, arrhythmia = ?9,
             vitals_notes = ?10, weight = ?11, height = ?12, bmi = ?13,
             obesity = ?14, smoking = ?15, alcohol = ?16,
             stimulant_use = ?17, sedentary = ?18,
             prior_cardiac_disease = ?19, stress = ?20,
             family_stroke_history = ?21, hypertension = ?22,
             diabetes = ?23, reason = ?24, symptom_onset = ?25,
             prior_conditions = ?26, family_history = ?27,
             medications = ?28, diagnosis = ?29, stroke_event = ?30
           WHERE visit_id = ?1"
        };
        Ok(conn.execute(sql, params)?)
      })
      .await?;
    Ok(affected)
  }

  async fn query_visits(&self, sql: String, binds: Vec<Option<String>>) -> Result<Vec<Visit>> {
    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(binds.iter()), |row| {
            RawVisit::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Patients ──────────────────────────────────────────────────────────────

  async fn add_patient(&self, input: NewPatient) -> Result<Patient> {
    // Surface duplicates as an application error rather than a raw
    // constraint failure.
    if self.find_patient_by_document(&input.document).await?.is_some() {
      return Err(Error::DuplicateDocument(input.document));
    }

    let patient = Patient {
      patient_id:        Uuid::new_v4(),
      created_at:        Utc::now(),
      name:              input.name,
      document_type:     input.document_type,
      document:          input.document,
      birth_date:        input.birth_date,
      sex:               input.sex,
      contact:           input.contact,
      emergency_contact: input.emergency_contact,
      risk_factors:      input.risk_factors,
      prior_stroke:      input.prior_stroke,
    };

    self.write_patient_row(&patient, true).await?;
    Ok(patient)
  }

  async fn get_patient(&self, id: Uuid) -> Result<Option<Patient>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {} FROM patients WHERE patient_id = ?1", RawPatient::COLUMNS);

    let raw: Option<RawPatient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawPatient::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPatient::into_patient).transpose()
  }

  async fn find_patient_by_document(&self, document: &str) -> Result<Option<Patient>> {
    let document = document.to_owned();
    let sql =
      format!("SELECT {} FROM patients WHERE document = ?1", RawPatient::COLUMNS);

    let raw: Option<RawPatient> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![document], |row| {
              RawPatient::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPatient::into_patient).transpose()
  }

  async fn list_patients(&self) -> Result<Vec<Patient>> {
    let sql = format!(
      "SELECT {} FROM patients ORDER BY created_at ASC",
      RawPatient::COLUMNS
    );

    let raws: Vec<RawPatient> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawPatient::from_row(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPatient::into_patient).collect()
  }

  async fn update_patient(&self, patient: &Patient) -> Result<()> {
    let affected = self.write_patient_row(patient, false).await?;
    if affected == 0 {
      return Err(Error::PatientNotFound(patient.patient_id));
    }
    Ok(())
  }

  async fn delete_patient(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM patients WHERE patient_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Visits ────────────────────────────────────────────────────────────────

  async fn add_visit(&self, input: NewVisit) -> Result<Visit> {
    let biometrics = Biometrics::from_measurements(input.weight, input.height)?;

    let visit = Visit {
      visit_id: Uuid::new_v4(),
      patient_id: input.patient_id,
      visit_date: input.visit_date,
      vitals: input.vitals,
      biometrics,
      risk_factors: input.risk_factors,
      comorbidities: input.comorbidities,
      narrative: input.narrative,
      stroke_event: input.stroke_event,
    };

    self.write_visit_row(&visit, true).await?;
    Ok(visit)
  }

  async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {} FROM visits WHERE visit_id = ?1", RawVisit::COLUMNS);

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawVisit::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn list_visits(&self, range: VisitDateRange) -> Result<Vec<Visit>> {
    let sql = format!(
      "SELECT {} FROM visits
       WHERE (?1 IS NULL OR visit_date >= ?1)
         AND (?2 IS NULL OR visit_date <= ?2)
       ORDER BY visit_date DESC, visit_id DESC",
      RawVisit::COLUMNS
    );
    let binds = vec![
      range.from.map(encode_date),
      range.to.map(encode_date),
    ];
    self.query_visits(sql, binds).await
  }

  async fn visits_for_patient(&self, patient_id: Uuid) -> Result<Vec<Visit>> {
    let sql = format!(
      "SELECT {} FROM visits WHERE patient_id = ?1
       ORDER BY visit_date DESC, visit_id DESC",
      RawVisit::COLUMNS
    );
    self.query_visits(sql, vec![Some(encode_uuid(patient_id))]).await
  }

  async fn latest_visit(&self, patient_id: Uuid) -> Result<Option<Visit>> {
    let sql = format!(
      "SELECT {} FROM visits WHERE patient_id = ?1
       ORDER BY visit_date DESC, visit_id DESC LIMIT 1",
      RawVisit::COLUMNS
    );
    let mut visits =
      self.query_visits(sql, vec![Some(encode_uuid(patient_id))]).await?;
    Ok(if visits.is_empty() { None } else { Some(visits.remove(0)) })
  }

  async fn update_visit(&self, visit: &Visit) -> Result<()> {
    let affected = self.write_visit_row(visit, false).await?;
    if affected == 0 {
      return Err(Error::VisitNotFound(visit.visit_id));
    }
    Ok(())
  }

  async fn delete_visit(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM visits WHERE visit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  async fn add_appointment(&self, input: NewAppointment) -> Result<Appointment> {
    let appointment = Appointment {
      appointment_id: Uuid::new_v4(),
      patient_id:     input.patient_id,
      scheduled_at:   input.scheduled_at,
      service:        input.service,
      staff_name:     input.staff_name,
      status:         input.status,
      notes:          input.notes,
    };

    let a = appointment.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO appointments (
             appointment_id, patient_id, scheduled_at, service, staff_name,
             status, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(a.appointment_id),
            encode_uuid(a.patient_id),
            encode_dt(a.scheduled_at),
            a.service,
            a.staff_name,
            encode_status(a.status),
            a.notes,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(appointment)
  }

  async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM appointments WHERE appointment_id = ?1",
      RawAppointment::COLUMNS
    );

    let raw: Option<RawAppointment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawAppointment::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAppointment::into_appointment).transpose()
  }

  async fn list_appointments(&self) -> Result<Vec<Appointment>> {
    let sql = format!(
      "SELECT {} FROM appointments ORDER BY scheduled_at ASC",
      RawAppointment::COLUMNS
    );

    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawAppointment::from_row(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawAppointment::into_appointment)
      .collect()
  }

  async fn appointments_on(&self, day: NaiveDate) -> Result<Vec<Appointment>> {
    let day_str = encode_date(day);
    let sql = format!(
      "SELECT {} FROM appointments WHERE date(scheduled_at) = ?1
       ORDER BY scheduled_at ASC",
      RawAppointment::COLUMNS
    );

    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![day_str], |row| {
            RawAppointment::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawAppointment::into_appointment)
      .collect()
  }

  async fn update_appointment(&self, appointment: &Appointment) -> Result<()> {
    let a = appointment.clone();
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE appointments SET
             patient_id = ?2, scheduled_at = ?3, service = ?4,
             staff_name = ?5, status = ?6, notes = ?7
           WHERE appointment_id = ?1",
          rusqlite::params![
            encode_uuid(a.appointment_id),
            encode_uuid(a.patient_id),
            encode_dt(a.scheduled_at),
            a.service,
            a.staff_name,
            encode_status(a.status),
            a.notes,
          ],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::AppointmentNotFound(appointment.appointment_id));
    }
    Ok(())
  }

  async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM appointments WHERE appointment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(affected > 0)
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_account(&self, input: NewAccount) -> Result<UserAccount> {
    if self
      .find_account_by_username(&input.username)
      .await?
      .is_some()
    {
      return Err(Error::DuplicateUsername(input.username));
    }

    let account = UserAccount {
      account_id:    Uuid::new_v4(),
      created_at:    Utc::now(),
      name:          input.name,
      username:      input.username,
      password_hash: input.password_hash,
    };

    let a = account.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             account_id, created_at, name, username, password_hash
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            encode_uuid(a.account_id),
            encode_dt(a.created_at),
            a.name,
            a.username,
            a.password_hash,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<UserAccount>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM accounts WHERE account_id = ?1",
      RawAccount::COLUMNS
    );

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], |row| {
              RawAccount::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn find_account_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
    let username = username.to_owned();
    let sql = format!(
      "SELECT {} FROM accounts WHERE username = ?1",
      RawAccount::COLUMNS
    );

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![username], |row| {
              RawAccount::from_row(row)
            })
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn count_patients(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM patients", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn count_stroke_events(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM visits WHERE stroke_event = 1",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn monthly_stroke_events(&self, since: NaiveDate) -> Result<Vec<MonthlyCount>> {
    let since_str = encode_date(since);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT strftime('%Y-%m', visit_date) AS month, COUNT(*)
           FROM visits
           WHERE stroke_event = 1 AND visit_date >= ?1
           GROUP BY month
           ORDER BY month ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(month, count)| MonthlyCount {
          month,
          stroke_events: count as u64,
        })
        .collect(),
    )
  }
}
