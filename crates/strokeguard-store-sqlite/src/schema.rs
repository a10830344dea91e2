//! SQL schema for the strokeguard SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS patients (
    patient_id             TEXT PRIMARY KEY,
    created_at             TEXT NOT NULL,   -- ISO 8601 UTC
    name                   TEXT NOT NULL,
    document_type          TEXT NOT NULL,   -- 'CC' | 'TI' | 'CE'
    document               TEXT NOT NULL UNIQUE,
    birth_date             TEXT NOT NULL,   -- ISO 8601 date
    sex                    TEXT NOT NULL,   -- 'M' | 'F'
    phone                  TEXT,
    address                TEXT,
    email                  TEXT,
    marital_status         TEXT,
    occupation             TEXT,
    blood_type             TEXT,
    insurer                TEXT,
    emergency_name         TEXT,
    emergency_phone        TEXT,
    emergency_relationship TEXT,
    hypertension           INTEGER NOT NULL DEFAULT 0,
    diabetes               INTEGER NOT NULL DEFAULT 0,
    smoking                INTEGER NOT NULL DEFAULT 0,
    sedentary              INTEGER NOT NULL DEFAULT 0,
    high_cholesterol       INTEGER NOT NULL DEFAULT 0,
    family_stroke_history  INTEGER NOT NULL DEFAULT 0,
    prior_stroke           INTEGER NOT NULL DEFAULT 0
);

-- Visits and appointments are lifecycle-bound to their patient.
CREATE TABLE IF NOT EXISTS visits (
    visit_id              TEXT PRIMARY KEY,
    patient_id            TEXT NOT NULL
                          REFERENCES patients(patient_id) ON DELETE CASCADE,
    visit_date            TEXT NOT NULL,    -- ISO 8601 date
    temperature           REAL,
    systolic_pressure     REAL NOT NULL,
    diastolic_pressure    REAL NOT NULL,
    heart_rate            INTEGER,
    respiratory_rate      INTEGER,
    arrhythmia            INTEGER NOT NULL DEFAULT 0,
    vitals_notes          TEXT,
    weight                REAL NOT NULL,
    height                REAL NOT NULL,
    bmi                   REAL NOT NULL,    -- derived; written by the store
    obesity               INTEGER NOT NULL DEFAULT 0,
    smoking               INTEGER NOT NULL DEFAULT 0,
    alcohol               INTEGER NOT NULL DEFAULT 0,
    stimulant_use         INTEGER NOT NULL DEFAULT 0,
    sedentary             INTEGER NOT NULL DEFAULT 0,
    prior_cardiac_disease INTEGER NOT NULL DEFAULT 0,
    stress                INTEGER NOT NULL DEFAULT 0,
    family_stroke_history INTEGER NOT NULL DEFAULT 0,
    hypertension          INTEGER NOT NULL DEFAULT 0,
    diabetes              INTEGER NOT NULL DEFAULT 0,
    reason                TEXT,
    symptom_onset         TEXT,             -- ISO 8601 date
    prior_conditions      TEXT,
    family_history        TEXT,
    medications           TEXT,
    diagnosis             TEXT,
    stroke_event          INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id TEXT PRIMARY KEY,
    patient_id     TEXT NOT NULL
                   REFERENCES patients(patient_id) ON DELETE CASCADE,
    scheduled_at   TEXT NOT NULL,   -- ISO 8601 UTC
    service        TEXT NOT NULL,
    staff_name     TEXT,
    status         TEXT NOT NULL DEFAULT 'awaiting',
    notes          TEXT
);

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    created_at    TEXT NOT NULL,
    name          TEXT NOT NULL,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS patients_document_idx   ON patients(document);
CREATE INDEX IF NOT EXISTS visits_patient_idx      ON visits(patient_id);
CREATE INDEX IF NOT EXISTS visits_date_idx         ON visits(visit_date);
CREATE INDEX IF NOT EXISTS appointments_patient_idx ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS appointments_time_idx   ON appointments(scheduled_at);
CREATE INDEX IF NOT EXISTS accounts_username_idx   ON accounts(username);

PRAGMA user_version = 1;
";
