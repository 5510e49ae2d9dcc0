// app/src/web/handlers/session_handlers.rs

use crate::errors::AppError;
use crate::identity::ensure_anonymous_identity;
use crate::state::AppState;
use crate::web::Caller;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

/// Issues an anonymous identity, or confirms the one the caller presented.
#[instrument(name = "handler::start_session", skip(app_state, caller))]
pub async fn start_session_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let presented = caller.identity.is_some();
  let backend = app_state.backend_for(caller.identity);
  let identity = ensure_anonymous_identity(&backend)
    .await?
    .ok_or_else(|| AppError::BackendUnavailable("Anonymous sign-in is disabled.".to_string()))?;

  info!(uid = %identity, reused = presented, "Session ready.");
  let body = json!({ "uid": identity });
  if presented {
    Ok(HttpResponse::Ok().json(body))
  } else {
    Ok(HttpResponse::Created().json(body))
  }
}
