//! Aggregate statistics reporter: population-level summaries computed
//! directly from the store.
//!
//! All ratios use the patient count as denominator and define 0/0 as 0, so
//! an empty clinic reports zeroes rather than errors.

use std::collections::HashMap;

use axum::{Json, extract::State};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use strokeguard_core::{
  patient::{Patient, Sex},
  store::{MonthlyCount, RecordStore},
};

use crate::{AppState, auth::Authenticated, error::ApiError};

/// The 7 fixed age buckets. Every patient falls in exactly one; anyone
/// outside 18–79 lands in the open-ended last bucket.
const AGE_BUCKETS: [&str; 7] =
  ["18-29", "30-39", "40-49", "50-59", "60-69", "70-79", "80+"];

// ─── Report types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RiskFactorPrevalence {
  pub hypertension:          f64,
  pub diabetes:              f64,
  pub smoking:               f64,
  pub sedentary:             f64,
  pub high_cholesterol:      f64,
  pub family_stroke_history: f64,
}

#[derive(Debug, Serialize)]
pub struct SexCount {
  pub sex:   Sex,
  pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct AgeBucketCount {
  pub range: &'static str,
  pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
  pub total_patients:         u64,
  pub total_stroke_events:    u64,
  /// Stroke events over patient count; 0 for an empty clinic.
  pub stroke_rate:            f64,
  /// Exactly 12 entries, ascending, zero-filled.
  pub monthly_incidence:      Vec<MonthlyCount>,
  pub risk_factor_prevalence: RiskFactorPrevalence,
  pub sex_distribution:       Vec<SexCount>,
  pub age_distribution:       Vec<AgeBucketCount>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn ratio(numerator: u64, denominator: u64) -> f64 {
  if denominator == 0 {
    0.0
  } else {
    numerator as f64 / denominator as f64
  }
}

/// The trailing 12 calendar months as `YYYY-MM`, ascending, ending with the
/// month of `today`.
fn trailing_months(today: NaiveDate) -> Vec<String> {
  let mut year = today.year();
  let mut month = today.month() as i32;
  let mut months = Vec::with_capacity(12);
  for _ in 0..12 {
    months.push(format!("{year:04}-{month:02}"));
    month -= 1;
    if month == 0 {
      month = 12;
      year -= 1;
    }
  }
  months.reverse();
  months
}

/// First day of the oldest month in the trailing window.
fn window_start(today: NaiveDate) -> NaiveDate {
  let mut year = today.year();
  let mut month = today.month() as i32 - 11;
  if month <= 0 {
    month += 12;
    year -= 1;
  }
  NaiveDate::from_ymd_opt(year, month as u32, 1)
    .unwrap_or(today)
}

fn age_bucket(age_years: i64) -> &'static str {
  match age_years {
    18..=29 => "18-29",
    30..=39 => "30-39",
    40..=49 => "40-49",
    50..=59 => "50-59",
    60..=69 => "60-69",
    70..=79 => "70-79",
    _ => "80+",
  }
}

fn age_at(today: NaiveDate, birth_date: NaiveDate) -> i64 {
  ((today - birth_date).num_days() as f64 / 365.25) as i64
}

fn prevalence(patients: &[Patient]) -> RiskFactorPrevalence {
  let total = patients.len() as u64;
  let count = |f: fn(&Patient) -> bool| {
    patients.iter().filter(|p| f(p)).count() as u64
  };
  RiskFactorPrevalence {
    hypertension:          ratio(count(|p| p.risk_factors.hypertension), total),
    diabetes:              ratio(count(|p| p.risk_factors.diabetes), total),
    smoking:               ratio(count(|p| p.risk_factors.smoking), total),
    sedentary:             ratio(count(|p| p.risk_factors.sedentary), total),
    high_cholesterol:      ratio(count(|p| p.risk_factors.high_cholesterol), total),
    family_stroke_history: ratio(
      count(|p| p.risk_factors.family_stroke_history),
      total,
    ),
  }
}

// ─── Handler ─────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn report<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<StatsReport>, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let today = Utc::now().date_naive();

  let total_patients =
    state.store.count_patients().await.map_err(ApiError::store)?;
  let total_stroke_events =
    state.store.count_stroke_events().await.map_err(ApiError::store)?;

  let recorded = state
    .store
    .monthly_stroke_events(window_start(today))
    .await
    .map_err(ApiError::store)?;
  let by_month: HashMap<String, u64> = recorded
    .into_iter()
    .map(|m| (m.month, m.stroke_events))
    .collect();
  let monthly_incidence = trailing_months(today)
    .into_iter()
    .map(|month| {
      let stroke_events = by_month.get(&month).copied().unwrap_or(0);
      MonthlyCount { month, stroke_events }
    })
    .collect();

  let patients = state.store.list_patients().await.map_err(ApiError::store)?;

  let male = patients.iter().filter(|p| p.sex == Sex::Male).count() as u64;
  let female = patients.iter().filter(|p| p.sex == Sex::Female).count() as u64;
  let sex_distribution = vec![
    SexCount { sex: Sex::Male, count: male },
    SexCount { sex: Sex::Female, count: female },
  ];

  let mut bucket_counts: HashMap<&'static str, u64> = HashMap::new();
  for patient in &patients {
    let bucket = age_bucket(age_at(today, patient.birth_date));
    *bucket_counts.entry(bucket).or_insert(0) += 1;
  }
  let age_distribution = AGE_BUCKETS
    .into_iter()
    .map(|range| AgeBucketCount {
      range,
      count: bucket_counts.get(range).copied().unwrap_or(0),
    })
    .collect();

  Ok(Json(StatsReport {
    total_patients,
    total_stroke_events,
    stroke_rate: ratio(total_stroke_events, total_patients),
    monthly_incidence,
    risk_factor_prevalence: prevalence(&patients),
    sex_distribution,
    age_distribution,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn trailing_months_are_twelve_ascending_ending_today() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let months = trailing_months(today);
    assert_eq!(months.len(), 12);
    assert_eq!(months.first().unwrap(), "2023-04");
    assert_eq!(months.last().unwrap(), "2024-03");
    assert!(months.windows(2).all(|w| w[0] < w[1]));
  }

  #[test]
  fn trailing_months_handle_january() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let months = trailing_months(today);
    assert_eq!(months.first().unwrap(), "2023-02");
    assert_eq!(months.last().unwrap(), "2024-01");
  }

  #[test]
  fn window_start_is_first_of_oldest_month() {
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert_eq!(
      window_start(today),
      NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
    );
  }

  #[test]
  fn age_buckets_cover_every_age() {
    assert_eq!(age_bucket(18), "18-29");
    assert_eq!(age_bucket(29), "18-29");
    assert_eq!(age_bucket(30), "30-39");
    assert_eq!(age_bucket(79), "70-79");
    assert_eq!(age_bucket(80), "80+");
    assert_eq!(age_bucket(97), "80+");
    // Under-18 patients land in the open-ended bucket, mirroring the
    // open-ended ELSE arm of the reporting query.
    assert_eq!(age_bucket(10), "80+");
  }

  #[test]
  fn ratio_defines_division_by_zero_as_zero() {
    assert_eq!(ratio(0, 0), 0.0);
    assert_eq!(ratio(5, 0), 0.0);
    assert_eq!(ratio(1, 4), 0.25);
  }
}
