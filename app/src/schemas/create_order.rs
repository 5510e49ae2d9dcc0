// app/src/schemas/create_order.rs

use super::{char_len, rule, trimmed_optional, FieldErrors};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Largest |epoch millis| a browser `Date` can hold.
pub const MAX_DATETIME_MILLIS: i64 = 8_640_000_000_000_000;

const FIELD_ORDER: &[&str] = &["orderName", "orderDescription", "maxParticipants", "lastOrderAt"];

/// Deadline as submitted: epoch milliseconds, or an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeadlineInput {
  Millis(i64),
  Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderForm {
  #[validate(custom(function = "order_name_bounds"))]
  pub order_name: String,

  #[serde(default)]
  #[validate(length(max = 200, code = "too-long", message = "Order description cannot exceed 200 characters"))]
  pub order_description: Option<String>,

  #[validate(custom(function = "participant_bounds"))]
  pub max_participants: i64,

  #[serde(default)]
  pub last_order_at: Option<DeadlineInput>,
}

/// A create-order form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub order_name: String,
  pub order_description: Option<String>,
  pub max_participants: u32,
  pub last_order_at: DateTime<Utc>,
}

fn order_name_bounds(name: &str) -> Result<(), ValidationError> {
  match char_len(name) {
    n if n < 3 => Err(rule("too-short", "Order name must be at least 3 characters long")),
    n if n > 50 => Err(rule("too-long", "Order name cannot exceed 50 characters")),
    _ => Ok(()),
  }
}

fn participant_bounds(count: i64) -> Result<(), ValidationError> {
  if count < 1 {
    Err(rule("too-small", "At least 1 participant is required"))
  } else if count > 100 {
    Err(rule("too-large", "Maximum allowed participants is 100"))
  } else {
    Ok(())
  }
}

enum Deadline {
  Missing,
  Invalid,
  Valid(DateTime<Utc>),
}

fn parse_deadline(input: Option<&DeadlineInput>) -> Deadline {
  match input {
    None => Deadline::Missing,
    Some(DeadlineInput::Millis(ms)) if ms.unsigned_abs() > MAX_DATETIME_MILLIS as u64 => Deadline::Invalid,
    Some(DeadlineInput::Millis(ms)) => DateTime::from_timestamp_millis(*ms)
      .map(Deadline::Valid)
      .unwrap_or(Deadline::Invalid),
    Some(DeadlineInput::Text(raw)) if raw.trim().is_empty() => Deadline::Missing,
    Some(DeadlineInput::Text(raw)) => DateTime::parse_from_rfc3339(raw.trim())
      .map(|at| Deadline::Valid(at.with_timezone(&Utc)))
      .unwrap_or(Deadline::Invalid),
  }
}

impl CreateOrderForm {
  fn trimmed(&self) -> Self {
    Self {
      order_name: self.order_name.trim().to_string(),
      order_description: trimmed_optional(&self.order_description),
      max_participants: self.max_participants,
      last_order_at: self.last_order_at.clone(),
    }
  }

  /// Validates against the instant `now`; the deadline must be strictly later.
  pub fn validate_at(&self, now: DateTime<Utc>) -> Result<NewOrder, FieldErrors> {
    let form = self.trimmed();
    let mut errors = match form.validate() {
      Ok(()) => FieldErrors::default(),
      Err(e) => FieldErrors::from_validation(&e),
    };

    let deadline = match parse_deadline(form.last_order_at.as_ref()) {
      Deadline::Missing => {
        errors.insert("lastOrderAt", "required", "Please select the last order date and time");
        None
      }
      Deadline::Invalid => {
        errors.insert("lastOrderAt", "invalid-datetime", "Please select a valid date and time");
        None
      }
      Deadline::Valid(at) if at <= now => {
        errors.insert("lastOrderAt", "datetime-not-future", "Please select a later date and time");
        None
      }
      Deadline::Valid(at) => Some(at),
    };

    match deadline {
      Some(last_order_at) if errors.is_empty() => Ok(NewOrder {
        order_name: form.order_name,
        order_description: form.order_description,
        max_participants: form.max_participants as u32,
        last_order_at,
      }),
      _ => Err(errors.ordered_by(FIELD_ORDER)),
    }
  }

  pub fn validate_now(&self) -> Result<NewOrder, FieldErrors> {
    self.validate_at(Utc::now())
  }
}
