//! Request-payload validation with field-level error accumulation.
//!
//! Checks mirror what the clinic front desk actually needs: digits-only
//! documents, plausible phone numbers, dates that are not in the future.

use chrono::NaiveDate;

use crate::error::ApiError;

/// Accumulated `(field, message)` pairs, rendered as
/// `{"errors": {field: [messages...]}}` with a 400.
#[derive(Debug, Default)]
pub struct FieldErrors {
  errors: Vec<(String, String)>,
}

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, field: &str, message: impl Into<String>) {
    self.errors.push((field.to_owned(), message.into()));
  }

  pub fn is_empty(&self) -> bool { self.errors.is_empty() }

  /// Finish validation: `Err` with a 400 payload if anything accumulated.
  pub fn into_result(self) -> Result<(), ApiError> {
    if self.is_empty() { Ok(()) } else { Err(ApiError::Validation(self)) }
  }

  /// Group messages per field for the response body.
  pub fn into_map(self) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    for (field, message) in self.errors {
      if let serde_json::Value::Array(messages) = map
        .entry(field)
        .or_insert_with(|| serde_json::Value::Array(Vec::new()))
      {
        messages.push(serde_json::Value::String(message));
      }
    }
    map
  }
}

// ─── Field checks ────────────────────────────────────────────────────────────

pub fn require_non_empty(errors: &mut FieldErrors, field: &str, value: &str) {
  if value.trim().is_empty() {
    errors.push(field, "must not be empty");
  }
}

/// Document numbers are digits only, no separators.
pub fn require_digits(errors: &mut FieldErrors, field: &str, value: &str) {
  if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
    errors.push(field, "must contain only digits");
  }
}

/// Optional phone: `+` prefix allowed, then 7 to 15 digits.
pub fn check_phone(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
  let Some(value) = value else { return };
  let digits = value.strip_prefix('+').unwrap_or(value);
  let ok = (7..=15).contains(&digits.len())
    && digits.chars().all(|c| c.is_ascii_digit());
  if !ok {
    errors.push(field, "must be 7 to 15 digits, optionally prefixed with +");
  }
}

/// Optional email: requires a non-empty local part and a dotted domain.
pub fn check_email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
  let Some(value) = value else { return };
  let ok = matches!(
    value.split_once('@'),
    Some((local, domain))
      if !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
  );
  if !ok {
    errors.push(field, "must be a valid email address");
  }
}

pub fn check_not_future(
  errors: &mut FieldErrors,
  field: &str,
  value: NaiveDate,
  today: NaiveDate,
) {
  if value > today {
    errors.push(field, "must not be in the future");
  }
}

pub fn require_positive(errors: &mut FieldErrors, field: &str, value: f64) {
  if !(value > 0.0) {
    errors.push(field, "must be positive");
  }
}

/// Passwords: at least 6 characters with an uppercase letter, a lowercase
/// letter, and a digit.
pub fn check_password(errors: &mut FieldErrors, field: &str, value: &str) {
  if value.len() < 6 {
    errors.push(field, "must be at least 6 characters");
  }
  let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
  let has_digit = value.chars().any(|c| c.is_ascii_digit());
  if !(has_upper && has_lower && has_digit) {
    errors.push(
      field,
      "must include at least one uppercase letter, one lowercase letter, and one digit",
    );
  }
}
