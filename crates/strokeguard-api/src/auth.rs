//! Token issuance/verification and the account endpoints.
//!
//! Credentials are verified against argon2 PHC hashes; successful
//! registration or login returns a signed HS256 token bound to the account
//! id, valid for two hours. Protected routes take it in a
//! `Authorization: Bearer <token>` header via the [`Authenticated`]
//! extractor.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use chrono::Utc;
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use strokeguard_core::{account::NewAccount, store::RecordStore};
use uuid::Uuid;

use crate::{
  AppState,
  error::{ApiError, ApiJson},
  validate::{FieldErrors, check_password, require_non_empty},
};

/// Token lifetime: two hours from issuance.
const TOKEN_TTL_SECS: u64 = 2 * 60 * 60;

// ─── Keys and claims ─────────────────────────────────────────────────────────

/// Signing/verification keys derived from the configured secret.
pub struct AuthKeys {
  encoding: EncodingKey,
  decoding: DecodingKey,
}

impl AuthKeys {
  pub fn new(secret: &str) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  /// Account id.
  sub: String,
  iat: u64,
  exp: u64,
}

/// Sign a token for `account_id`.
pub fn issue_token(keys: &AuthKeys, account_id: Uuid) -> Result<String, ApiError> {
  let now = Utc::now().timestamp() as u64;
  let claims = Claims {
    sub: account_id.to_string(),
    iat: now,
    exp: now + TOKEN_TTL_SECS,
  };
  encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Verify the bearer token in `headers` and return the bound account id.
pub fn verify_bearer(headers: &HeaderMap, keys: &AuthKeys) -> Result<Uuid, ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized("token missing".into()))?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or_else(|| ApiError::Unauthorized("token missing".into()))?;

  let data = decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
    .map_err(|e| match e.kind() {
      ErrorKind::ExpiredSignature => ApiError::Unauthorized("token expired".into()),
      _ => ApiError::Unauthorized("token invalid".into()),
    })?;

  Uuid::parse_str(&data.claims.sub)
    .map_err(|_| ApiError::Unauthorized("token invalid".into()))
}

/// Extractor marking a request as authenticated; carries the account id the
/// token was issued for.
pub struct Authenticated {
  pub account_id: Uuid,
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let account_id = verify_bearer(&parts.headers, &state.auth)?;
    Ok(Authenticated { account_id })
  }
}

// ─── Password hashing ────────────────────────────────────────────────────────

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn password_matches(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub username: String,
  pub password: String,
}

impl RegisterBody {
  fn validate(&self) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    require_non_empty(&mut errors, "name", &self.name);
    if self.username.trim().len() < 3 {
      errors.push("username", "must be at least 3 characters");
    }
    check_password(&mut errors, "password", &self.password);
    errors.into_result()
  }
}

/// `POST /auth/register` — create an account and issue a token.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  body.validate()?;

  if state
    .store
    .find_account_by_username(&body.username)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(ApiError::BadRequest("the username is already taken".into()));
  }

  let account = state
    .store
    .add_account(NewAccount {
      name:          body.name,
      username:      body.username,
      password_hash: hash_password(&body.password)?,
    })
    .await
    .map_err(ApiError::store)?;

  let token = issue_token(&state.auth, account.account_id)?;
  Ok((StatusCode::CREATED, Json(json!({ "token": token, "user": account }))))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

/// `POST /auth/login` — verify credentials and issue a token.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let account = state
    .store
    .find_account_by_username(&body.username)
    .await
    .map_err(ApiError::store)?;

  // Same response whether the username or the password is wrong.
  let Some(account) = account else {
    return Err(ApiError::Unauthorized("invalid credentials".into()));
  };
  if !password_matches(&body.password, &account.password_hash) {
    return Err(ApiError::Unauthorized("invalid credentials".into()));
  }

  let token = issue_token(&state.auth, account.account_id)?;
  Ok(Json(json!({ "token": token })))
}

/// `GET /auth/profile` — the account the presented token was issued for.
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let account = state
    .store
    .get_account(auth.account_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("account not found".into()))?;
  Ok(Json(account))
}
