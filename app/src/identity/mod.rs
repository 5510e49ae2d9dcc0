// app/src/identity/mod.rs

//! Anonymous identity: the provider contract, an in-process provider, the
//! server-side session registry and the bootstrap routine.

pub mod anonymous;
pub mod sessions;

pub use anonymous::AnonymousAuth;
pub use sessions::SessionRegistry;

use crate::backend::Backend;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Opaque, stable id of a (possibly anonymous) user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
  pub fn new(uid: impl Into<String>) -> Self {
    Self(uid.into())
  }

  pub fn generate() -> Self {
    Self(Uuid::new_v4().simple().to_string())
  }

  pub fn uid(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
  fn current_identity(&self) -> Option<Identity>;

  /// Requests an anonymous identity. Completion does not imply the auth
  /// state has changed yet; watch `watch_auth_state` for that.
  async fn sign_in_anonymously(&self) -> Result<()>;

  fn watch_auth_state(&self) -> watch::Receiver<Option<Identity>>;
}

/// Reuses the current identity or signs in anonymously and waits until the
/// auth state reports one. Without an identity provider this logs a warning
/// and resolves to `None`.
#[instrument(name = "identity::ensure_anonymous", skip(backend), err(Display))]
pub async fn ensure_anonymous_identity(backend: &Backend) -> Result<Option<Identity>> {
  let Some(auth) = backend.auth() else {
    warn!("No identity provider configured; continuing without an identity.");
    return Ok(None);
  };
  if let Some(identity) = auth.current_identity() {
    return Ok(Some(identity));
  }

  let mut auth_state = auth.watch_auth_state();
  auth.sign_in_anonymously().await?;
  let identity = auth_state
    .wait_for(Option::is_some)
    .await
    .map_err(|_| AppError::Identity("Auth state stream closed before sign-in completed.".to_string()))?
    .clone();
  if let Some(identity) = &identity {
    info!(uid = %identity, "Anonymous identity established.");
  }
  Ok(identity)
}

/// Startup variant of [`ensure_anonymous_identity`] that never fails.
pub async fn bootstrap_session(backend: &Backend) -> Option<Identity> {
  match ensure_anonymous_identity(backend).await {
    Ok(identity) => identity,
    Err(e) => {
      error!(error = %e, "Failed to bootstrap anonymous session.");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  struct SlowAuth {
    state: watch::Sender<Option<Identity>>,
    sign_ins: AtomicUsize,
  }

  #[async_trait]
  impl IdentityProvider for SlowAuth {
    fn current_identity(&self) -> Option<Identity> {
      self.state.borrow().clone()
    }

    async fn sign_in_anonymously(&self) -> Result<()> {
      self.sign_ins.fetch_add(1, Ordering::SeqCst);
      let state = self.state.clone();
      tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        state.send_replace(Some(Identity::new("late-uid")));
      });
      Ok(())
    }

    fn watch_auth_state(&self) -> watch::Receiver<Option<Identity>> {
      self.state.subscribe()
    }
  }

  struct BrokenAuth;

  #[async_trait]
  impl IdentityProvider for BrokenAuth {
    fn current_identity(&self) -> Option<Identity> {
      None
    }

    async fn sign_in_anonymously(&self) -> Result<()> {
      Err(AppError::Identity("provider offline".to_string()))
    }

    fn watch_auth_state(&self) -> watch::Receiver<Option<Identity>> {
      watch::channel(None).1
    }
  }

  #[tokio::test]
  async fn waits_for_the_auth_state_to_report_the_identity() {
    let auth = Arc::new(SlowAuth {
      state: watch::channel(None).0,
      sign_ins: AtomicUsize::new(0),
    });
    let backend = Backend::unconfigured().with_auth(auth.clone());
    let identity = ensure_anonymous_identity(&backend).await.unwrap();
    assert_eq!(identity, Some(Identity::new("late-uid")));

    let again = ensure_anonymous_identity(&backend).await.unwrap();
    assert_eq!(again, identity);
    assert_eq!(auth.sign_ins.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn missing_provider_resolves_to_none() {
    assert_eq!(ensure_anonymous_identity(&Backend::unconfigured()).await.unwrap(), None);
  }

  #[tokio::test]
  async fn bootstrap_swallows_provider_errors() {
    let backend = Backend::unconfigured().with_auth(Arc::new(BrokenAuth));
    assert!(ensure_anonymous_identity(&backend).await.is_err());
    assert_eq!(bootstrap_session(&backend).await, None);
  }
}
