// app/src/web/caller.rs

use crate::errors::AppError;
use crate::identity::Identity;
use crate::state::AppState;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;

/// The identity named by `Authorization: Bearer <uid>`, if this server issued
/// it. A missing or unknown token is not an error here; operations that need
/// an identity report `unauthenticated` themselves.
#[derive(Debug, Clone)]
pub struct Caller {
  pub identity: Option<Identity>,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

impl FromRequest for Caller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };
    let identity = match (bearer_token(req), &state.sessions) {
      (Some(token), Some(sessions)) => {
        let resolved = sessions.resolve(token);
        if resolved.is_none() {
          debug!("Bearer token does not name an issued identity.");
        }
        resolved
      }
      _ => None,
    };
    ready(Ok(Caller { identity }))
  }
}
