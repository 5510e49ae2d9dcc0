// app/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use patungan_flow::FlowError;
use serde_json::json;
use thiserror::Error;

use crate::schemas::FieldErrors;
use crate::store::StoreError;

/// Shown for any backend failure on the create-order form.
pub const CREATE_ORDER_FAILED_MESSAGE: &str = "Error when creating order, please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation failed: {0}")]
  Validation(FieldErrors),

  #[error("Authentication required: {0}")]
  Unauthenticated(String),

  #[error("Backend unavailable: {0}")]
  BackendUnavailable(String),

  #[error("Resource not found: {0}")]
  NotFound(String),

  #[error("Document store error: {0}")]
  Store(#[from] StoreError),

  #[error("Identity provider error: {0}")]
  Identity(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),

  /// A backend failure while creating an order; shown with its own message.
  #[error("Order creation failed: {0}")]
  OrderCreation(Box<AppError>),
}

impl AppError {
  /// Stable, machine-readable kind.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation-failed",
      AppError::Unauthenticated(_) => "unauthenticated",
      AppError::BackendUnavailable(_) => "backend-unavailable",
      AppError::NotFound(_) => "not-found",
      AppError::Store(_) | AppError::Identity(_) => "unknown-backend-error",
      AppError::Config(_) => "configuration-error",
      AppError::Workflow { .. } | AppError::Internal(_) => "internal-error",
      AppError::OrderCreation(inner) => inner.code(),
    }
  }

  /// Backend failures on the create-order form carry that form's message.
  pub fn for_order_creation(self) -> Self {
    match self {
      AppError::Store(_) | AppError::Identity(_) => AppError::OrderCreation(Box::new(self)),
      other => other,
    }
  }

  /// The single message a form shows for this failure.
  pub fn user_message(&self) -> String {
    match self {
      AppError::Validation(fields) => fields
        .first()
        .map(|(_, e)| e.message.clone())
        .unwrap_or_else(|| "Please check the form and try again.".to_string()),
      AppError::Unauthenticated(_) => "Your session is not ready yet. Please reload and try again.".to_string(),
      AppError::BackendUnavailable(_) => "The service is not available right now.".to_string(),
      AppError::NotFound(m) => m.clone(),
      AppError::OrderCreation(_) => CREATE_ORDER_FAILED_MESSAGE.to_string(),
      _ => "Something went wrong, please try again later.".to_string(),
    }
  }

  /// Top-level form field the message belongs to, if any.
  ///
  /// Nested paths such as `items[0].itemName` collapse to their top-level
  /// field (`items`).
  pub fn target_field(&self) -> Option<String> {
    match self {
      AppError::Validation(fields) => fields.first().map(|(path, _)| FieldErrors::top_level(path).to_string()),
      _ => None,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::OrderCreation(inner) => inner.status_code(),
      AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::warn!(application_error = %self, code = self.code(), "Responding with error");
    let fields = match self {
      AppError::Validation(fields) => fields.messages(),
      _ => Default::default(),
    };
    HttpResponse::build(self.status_code()).json(json!({
      "error": self.code(),
      "message": self.user_message(),
      "field": self.target_field(),
      "fields": fields,
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
