//! JSON REST API for the strokeguard clinical record service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`strokeguard_core::store::RecordStore`]. The risk scorer is constructed
//! once at startup and injected through [`AppState`]; handlers never touch
//! global state.

pub mod appointments;
pub mod auth;
pub mod error;
pub mod patients;
pub mod risk;
pub mod stats;
pub mod validate;
pub mod visits;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use strokeguard_core::store::RecordStore;
use strokeguard_risk::RiskScorer;
use tower_http::trace::TraceLayer;

use auth::AuthKeys;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file.
  pub db_path:    PathBuf,
  /// Fitted classifier artifact (JSON).
  pub model_path: PathBuf,
  /// HS256 secret for session tokens.
  pub jwt_secret: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub scorer: Arc<RiskScorer>,
  pub auth:   Arc<AuthKeys>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router. Every route except `/auth/register` and
/// `/auth/login` requires a bearer token.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Authentication
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/profile", get(auth::profile::<S>))
    // Patients
    .route(
      "/patients",
      get(patients::list::<S>).post(patients::create::<S>),
    )
    .route(
      "/patients/{id}",
      get(patients::get_one::<S>)
        .put(patients::update::<S>)
        .delete(patients::delete::<S>),
    )
    // Visits
    .route("/visits", get(visits::list::<S>).post(visits::create::<S>))
    .route(
      "/visits/{id}",
      get(visits::get_one::<S>)
        .put(visits::update::<S>)
        .delete(visits::delete::<S>),
    )
    .route("/visits/patient/{id}", get(visits::for_patient::<S>))
    .route(
      "/visits/patient/{id}/summary",
      get(visits::patient_summary::<S>),
    )
    // Appointments
    .route(
      "/appointments",
      get(appointments::list::<S>).post(appointments::create::<S>),
    )
    .route("/appointments/today", get(appointments::today::<S>))
    .route(
      "/appointments/{id}",
      get(appointments::get_one::<S>)
        .put(appointments::update::<S>)
        .delete(appointments::delete::<S>),
    )
    // Risk prediction
    .route("/risk/patients", get(risk::list::<S>))
    .route("/risk/patients/{id}", get(risk::predict::<S>))
    // Aggregate statistics
    .route("/stats", get(stats::report::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Datelike, Days, Utc};
  use serde_json::{Value, json};
  use strokeguard_risk::{ClassifierArtifact, FEATURE_NAMES, RiskScorer};
  use strokeguard_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  /// One tree binning systolic pressure (feature 3) into four leaves:
  /// <=120 -> 0.10, <=140 -> 0.30, <=160 -> 0.75, else 0.95.
  fn test_artifact() -> ClassifierArtifact {
    let names: Vec<String> =
      FEATURE_NAMES.iter().map(|n| (*n).to_owned()).collect();
    let raw = json!({
      "feature_names": names,
      "importances": [
        0.15, 0.01, 0.02, 0.30, 0.08, 0.05, 0.02, 0.03, 0.02, 0.20,
        0.08, 0.05, 0.07, 0.03, 0.02, 0.03, 0.06, 0.02, 0.03, 0.01, 0.02
      ],
      "trees": [
        { "nodes": [
          { "kind": "split", "feature": 3, "threshold": 120.0, "left": 1, "right": 2 },
          { "kind": "leaf", "probability": 0.10 },
          { "kind": "split", "feature": 3, "threshold": 140.0, "left": 3, "right": 4 },
          { "kind": "leaf", "probability": 0.30 },
          { "kind": "split", "feature": 3, "threshold": 160.0, "left": 5, "right": 6 },
          { "kind": "leaf", "probability": 0.75 },
          { "kind": "leaf", "probability": 0.95 }
        ]}
      ]
    })
    .to_string();
    ClassifierArtifact::from_json_str(&raw).unwrap()
  }

  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:  Arc::new(store),
      scorer: Arc::new(RiskScorer::new(test_artifact())),
      auth:   Arc::new(AuthKeys::new("test-secret")),
    }
  }

  fn token(state: &AppState<SqliteStore>) -> String {
    auth::issue_token(&state.auth, Uuid::new_v4()).unwrap()
  }

  async fn request(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
      builder =
        builder.header(header::AUTHORIZATION, format!("Bearer {bearer}"));
    }
    let request = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(request).await.unwrap()
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn patient_body(document: &str, sex: &str, birth_date: &str) -> Value {
    json!({
      "name": "Carlos Restrepo",
      "document_type": "CC",
      "document": document,
      "birth_date": birth_date,
      "sex": sex,
    })
  }

  fn visit_body(patient_id: Uuid, visit_date: &str, systolic: f64) -> Value {
    json!({
      "patient_id": patient_id,
      "visit_date": visit_date,
      "vitals": {
        "temperature": 36.6,
        "systolic_pressure": systolic,
        "diastolic_pressure": 85.0,
        "heart_rate": 78,
        "respiratory_rate": 16
      },
      "weight": 74.0,
      "height": 1.71,
    })
  }

  async fn create_patient(
    state: &AppState<SqliteStore>,
    bearer: &str,
    document: &str,
  ) -> Uuid {
    let resp = request(
      state.clone(),
      "POST",
      "/patients",
      Some(bearer),
      Some(patient_body(document, "F", "1962-09-20")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    body["patient_id"].as_str().unwrap().parse().unwrap()
  }

  async fn create_visit(
    state: &AppState<SqliteStore>,
    bearer: &str,
    patient_id: Uuid,
    systolic: f64,
  ) {
    let resp = request(
      state.clone(),
      "POST",
      "/visits",
      Some(bearer),
      Some(visit_body(patient_id, "2024-03-01", systolic)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  // ── Auth ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_login_and_profile_round_trip() {
    let state = make_state().await;

    let resp = request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(json!({ "name": "Dr. Pardo", "username": "dpardo", "password": "Secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "dpardo");
    assert!(body["user"].get("password_hash").is_none());

    let resp = request(
      state.clone(),
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "dpardo", "password": "Secret1" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let login = body_json(resp).await;
    let bearer = login["token"].as_str().unwrap().to_owned();

    let resp =
      request(state, "GET", "/auth/profile", Some(&bearer), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let profile = body_json(resp).await;
    assert_eq!(profile["name"], "Dr. Pardo");
  }

  #[tokio::test]
  async fn duplicate_username_returns_400() {
    let state = make_state().await;
    let body =
      json!({ "name": "A", "username": "nurse1", "password": "Secret1" });

    let first = request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(body.clone()),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second =
      request(state, "POST", "/auth/register", None, Some(body)).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn weak_password_is_field_level_validation_error() {
    let state = make_state().await;
    let resp = request(
      state,
      "POST",
      "/auth/register",
      None,
      Some(json!({ "name": "A", "username": "abc", "password": "weak" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["errors"]["password"].is_array());
  }

  #[tokio::test]
  async fn login_with_wrong_password_returns_401() {
    let state = make_state().await;
    request(
      state.clone(),
      "POST",
      "/auth/register",
      None,
      Some(json!({ "name": "A", "username": "dpardo", "password": "Secret1" })),
    )
    .await;

    let resp = request(
      state,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "dpardo", "password": "Wrong1x" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn protected_routes_reject_missing_and_garbage_tokens() {
    let state = make_state().await;

    let resp = request(state.clone(), "GET", "/patients", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp =
      request(state, "GET", "/patients", Some("not-a-token"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Patients ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_patient() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "1012345678").await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["document"], "1012345678");
    assert_eq!(body["sex"], "F");

    let resp = request(state, "GET", "/patients", Some(&bearer), None).await;
    let list = body_json(resp).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn duplicate_document_returns_400_and_inserts_nothing() {
    let state = make_state().await;
    let bearer = token(&state);
    create_patient(&state, &bearer, "9001").await;

    let resp = request(
      state.clone(),
      "POST",
      "/patients",
      Some(&bearer),
      Some(patient_body("9001", "M", "1975-05-05")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(
      body["error"].as_str().unwrap().contains("already registered"),
      "body: {body}"
    );

    let resp = request(state, "GET", "/patients", Some(&bearer), None).await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn patient_validation_errors_are_field_level() {
    let state = make_state().await;
    let bearer = token(&state);
    let future = Utc::now()
      .date_naive()
      .checked_add_days(Days::new(30))
      .unwrap();

    let resp = request(
      state,
      "POST",
      "/patients",
      Some(&bearer),
      Some(json!({
        "name": "",
        "document_type": "CC",
        "document": "10-23",
        "birth_date": future.to_string(),
        "sex": "M",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["document"].is_array());
    assert!(body["errors"]["birth_date"].is_array());
  }

  #[tokio::test]
  async fn third_sex_category_is_rejected() {
    let state = make_state().await;
    let bearer = token(&state);

    let resp = request(
      state,
      "POST",
      "/patients",
      Some(&bearer),
      Some(patient_body("333", "X", "1980-01-01")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_patient_merges_partial_body() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "444").await;

    let resp = request(
      state.clone(),
      "PUT",
      &format!("/patients/{id}"),
      Some(&bearer),
      Some(json!({ "risk_factors": { "hypertension": true, "smoking": true } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["risk_factors"]["hypertension"], true);
    // Untouched fields keep their values.
    assert_eq!(body["document"], "444");
    assert_eq!(body["name"], "Carlos Restrepo");
  }

  #[tokio::test]
  async fn delete_patient_cascades_through_the_api() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "555").await;
    create_visit(&state, &bearer, id, 130.0).await;

    let resp = request(
      state.clone(),
      "DELETE",
      &format!("/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = request(
      state.clone(),
      "GET",
      &format!("/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = request(
      state,
      "GET",
      &format!("/visits/patient/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);
  }

  // ── Visits ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn visit_for_unknown_patient_returns_404() {
    let state = make_state().await;
    let bearer = token(&state);

    let resp = request(
      state,
      "POST",
      "/visits",
      Some(&bearer),
      Some(visit_body(Uuid::new_v4(), "2024-03-01", 120.0)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn future_visit_date_is_rejected() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "666").await;
    let future = Utc::now()
      .date_naive()
      .checked_add_days(Days::new(7))
      .unwrap();

    let resp = request(
      state,
      "POST",
      "/visits",
      Some(&bearer),
      Some(visit_body(id, &future.to_string(), 120.0)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert!(body["errors"]["visit_date"].is_array());
  }

  #[tokio::test]
  async fn visit_create_derives_bmi_and_update_recomputes_it() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "777").await;

    let resp = request(
      state.clone(),
      "POST",
      "/visits",
      Some(&bearer),
      Some(visit_body(id, "2024-03-01", 120.0)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let visit = body_json(resp).await;
    // 74.0 / 1.71² = 25.31
    assert_eq!(visit["biometrics"]["bmi"], 25.31);
    let visit_id = visit["visit_id"].as_str().unwrap();

    let resp = request(
      state,
      "PUT",
      &format!("/visits/{visit_id}"),
      Some(&bearer),
      Some(json!({ "weight": 80.0 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated = body_json(resp).await;
    // 80.0 / 1.71² = 27.36
    assert_eq!(updated["biometrics"]["bmi"], 27.36);
  }

  #[tokio::test]
  async fn patient_summary_averages_and_404_without_history() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "888").await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/visits/patient/{id}/summary"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    create_visit(&state, &bearer, id, 120.0).await;
    create_visit(&state, &bearer, id, 140.0).await;

    let resp = request(
      state,
      "GET",
      &format!("/visits/patient/{id}/summary"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["summary"]["total_visits"], 2);
    assert_eq!(body["summary"]["avg_bmi"], 25.31);
    assert_eq!(body["visits"].as_array().unwrap().len(), 2);
  }

  // ── Appointments ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn appointment_flow_and_today_filter() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "999").await;

    let now = Utc::now();
    let resp = request(
      state.clone(),
      "POST",
      "/appointments",
      Some(&bearer),
      Some(json!({
        "patient_id": id,
        "scheduled_at": now.to_rfc3339(),
        "service": "neurology consultation",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let appointment = body_json(resp).await;
    assert_eq!(appointment["status"], "awaiting");
    let appointment_id = appointment["appointment_id"].as_str().unwrap();

    // A slot on another day never shows in /today.
    let tomorrow = now.checked_add_days(Days::new(1)).unwrap();
    request(
      state.clone(),
      "POST",
      "/appointments",
      Some(&bearer),
      Some(json!({
        "patient_id": id,
        "scheduled_at": tomorrow.to_rfc3339(),
        "service": "follow-up",
      })),
    )
    .await;

    let resp = request(
      state.clone(),
      "GET",
      "/appointments/today",
      Some(&bearer),
      None,
    )
    .await;
    let todays = body_json(resp).await;
    assert_eq!(todays.as_array().unwrap().len(), 1);

    let resp = request(
      state,
      "PUT",
      &format!("/appointments/{appointment_id}"),
      Some(&bearer),
      Some(json!({ "status": "arrived" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "arrived");
  }

  #[tokio::test]
  async fn invalid_appointment_status_is_rejected() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "1010").await;

    let resp = request(
      state,
      "POST",
      "/appointments",
      Some(&bearer),
      Some(json!({
        "patient_id": id,
        "scheduled_at": Utc::now().to_rfc3339(),
        "service": "x-ray",
        "status": "no-show",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Risk prediction ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn predict_without_history_returns_404() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "2001").await;

    let resp = request(
      state.clone(),
      "GET",
      &format!("/risk/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = request(
      state,
      "GET",
      &format!("/risk/patients/{}", Uuid::new_v4()),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn high_risk_prediction_carries_explanation() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "2002").await;
    create_visit(&state, &bearer, id, 170.0).await;

    let resp = request(
      state,
      "GET",
      &format!("/risk/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    assert_eq!(body["risk"], "high");
    let probability = body["probability"].as_f64().unwrap();
    assert!(probability >= 0.7 && probability <= 1.0);

    let features = body["explanatory_features"].as_array().unwrap();
    assert!(!features.is_empty() && features.len() <= 5);
    // Highest importance in the test artifact is systolic pressure.
    assert_eq!(features[0]["feature"], "systolic_pressure");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);
    assert!(body["context"].is_string());
  }

  #[tokio::test]
  async fn low_risk_prediction_has_no_explanatory_features() {
    let state = make_state().await;
    let bearer = token(&state);
    let id = create_patient(&state, &bearer, "2003").await;
    create_visit(&state, &bearer, id, 110.0).await;

    let resp = request(
      state,
      "GET",
      &format!("/risk/patients/{id}"),
      Some(&bearer),
      None,
    )
    .await;
    let body = body_json(resp).await;
    assert_eq!(body["risk"], "low");
    assert!(body["probability"].as_f64().unwrap() < 0.7);
    assert_eq!(body["explanatory_features"].as_array().unwrap().len(), 0);
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn population_listing_partitions_sorts_and_skips_unvisited() {
    let state = make_state().await;
    let bearer = token(&state);

    let p_highest = create_patient(&state, &bearer, "3001").await;
    create_visit(&state, &bearer, p_highest, 170.0).await; // 0.95
    let p_high = create_patient(&state, &bearer, "3002").await;
    create_visit(&state, &bearer, p_high, 150.0).await; // 0.75
    let p_low = create_patient(&state, &bearer, "3003").await;
    create_visit(&state, &bearer, p_low, 130.0).await; // 0.30
    let p_lowest = create_patient(&state, &bearer, "3004").await;
    create_visit(&state, &bearer, p_lowest, 110.0).await; // 0.10
    let p_unvisited = create_patient(&state, &bearer, "3005").await;

    let resp =
      request(state, "GET", "/risk/patients", Some(&bearer), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    let high = body["high_risk"].as_array().unwrap();
    let low = body["low_risk"].as_array().unwrap();
    assert_eq!(high.len() + low.len(), 4);

    // High risk descending, low risk ascending.
    assert_eq!(high[0]["patient_id"], p_highest.to_string());
    assert_eq!(high[1]["patient_id"], p_high.to_string());
    assert_eq!(low[0]["patient_id"], p_lowest.to_string());
    assert_eq!(low[1]["patient_id"], p_low.to_string());

    let all_ids: Vec<&str> = high
      .iter()
      .chain(low)
      .map(|e| e["patient_id"].as_str().unwrap())
      .collect();
    assert!(!all_ids.contains(&p_unvisited.to_string().as_str()));
  }

  // ── Statistics ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_on_empty_store_are_zero_not_errors() {
    let state = make_state().await;
    let bearer = token(&state);

    let resp = request(state, "GET", "/stats", Some(&bearer), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;

    assert_eq!(body["total_patients"], 0);
    assert_eq!(body["total_stroke_events"], 0);
    assert_eq!(body["stroke_rate"], 0.0);
    assert_eq!(body["risk_factor_prevalence"]["hypertension"], 0.0);

    let monthly = body["monthly_incidence"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    assert!(monthly.iter().all(|m| m["stroke_events"] == 0));
  }

  #[tokio::test]
  async fn stats_reflect_stored_records() {
    let state = make_state().await;
    let bearer = token(&state);

    let id = create_patient(&state, &bearer, "4001").await;
    create_patient(&state, &bearer, "4002").await;

    // A stroke event dated this month.
    let today = Utc::now().date_naive();
    let mut body = visit_body(id, &today.to_string(), 150.0);
    body["stroke_event"] = json!(true);
    let resp =
      request(state.clone(), "POST", "/visits", Some(&bearer), Some(body))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = request(state, "GET", "/stats", Some(&bearer), None).await;
    let stats = body_json(resp).await;

    assert_eq!(stats["total_patients"], 2);
    assert_eq!(stats["total_stroke_events"], 1);
    assert_eq!(stats["stroke_rate"], 0.5);

    let monthly = stats["monthly_incidence"].as_array().unwrap();
    assert_eq!(monthly.len(), 12);
    let this_month = format!("{:04}-{:02}", today.year(), today.month());
    let last = monthly.last().unwrap();
    assert_eq!(last["month"], this_month);
    assert_eq!(last["stroke_events"], 1);
    // Months are ascending and zero-filled.
    let labels: Vec<&str> =
      monthly.iter().map(|m| m["month"].as_str().unwrap()).collect();
    let mut sorted = labels.clone();
    sorted.sort_unstable();
    assert_eq!(labels, sorted);

    // Age buckets partition the population.
    let bucket_total: u64 = stats["age_distribution"]
      .as_array()
      .unwrap()
      .iter()
      .map(|b| b["count"].as_u64().unwrap())
      .sum();
    assert_eq!(bucket_total, 2);

    let sexes = stats["sex_distribution"].as_array().unwrap();
    let total_by_sex: u64 =
      sexes.iter().map(|s| s["count"].as_u64().unwrap()).sum();
    assert_eq!(total_by_sex, 2);
  }
}
