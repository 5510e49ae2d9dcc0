// app/src/backend.rs

use crate::errors::{AppError, Result};
use crate::identity::{Identity, IdentityProvider};
use crate::store::DocumentStore;
use std::sync::Arc;

/// The backend capabilities an operation may use. Either may be absent; each
/// operation checks for what it needs.
#[derive(Clone, Default)]
pub struct Backend {
  store: Option<Arc<dyn DocumentStore>>,
  auth: Option<Arc<dyn IdentityProvider>>,
}

impl Backend {
  pub fn new(store: Arc<dyn DocumentStore>, auth: Arc<dyn IdentityProvider>) -> Self {
    Self {
      store: Some(store),
      auth: Some(auth),
    }
  }

  pub fn unconfigured() -> Self {
    Self::default()
  }

  pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
    self.store = Some(store);
    self
  }

  pub fn with_auth(mut self, auth: Arc<dyn IdentityProvider>) -> Self {
    self.auth = Some(auth);
    self
  }

  pub fn has_store(&self) -> bool {
    self.store.is_some()
  }

  pub fn store(&self) -> Result<&Arc<dyn DocumentStore>> {
    self
      .store
      .as_ref()
      .ok_or_else(|| AppError::BackendUnavailable("No document store is configured.".to_string()))
  }

  pub fn auth(&self) -> Option<&Arc<dyn IdentityProvider>> {
    self.auth.as_ref()
  }

  /// The signed-in caller, or `unauthenticated`.
  pub fn current_identity(&self) -> Result<Identity> {
    self
      .auth
      .as_ref()
      .and_then(|auth| auth.current_identity())
      .ok_or_else(|| AppError::Unauthenticated("No signed-in identity.".to_string()))
  }
}

impl std::fmt::Debug for Backend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Backend")
      .field("store", &self.store.is_some())
      .field("auth", &self.auth.is_some())
      .finish()
  }
}
