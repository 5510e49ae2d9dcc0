// app/src/identity/anonymous.rs

use super::{Identity, IdentityProvider, SessionRegistry};
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Anonymous sign-in for a single client. With a registry attached, issued
/// identities are recorded there so the server can resolve them later.
pub struct AnonymousAuth {
  state: watch::Sender<Option<Identity>>,
  registry: Option<Arc<SessionRegistry>>,
}

impl AnonymousAuth {
  pub fn new() -> Self {
    Self {
      state: watch::channel(None).0,
      registry: None,
    }
  }

  /// Starts already signed in as `identity`.
  pub fn restore(identity: Identity) -> Self {
    Self {
      state: watch::channel(Some(identity)).0,
      registry: None,
    }
  }

  pub fn with_registry(registry: Arc<SessionRegistry>, restored: Option<Identity>) -> Self {
    Self {
      state: watch::channel(restored).0,
      registry: Some(registry),
    }
  }

  pub fn sign_out(&self) {
    if self.state.send_replace(None).is_some() {
      debug!("Signed out.");
    }
  }
}

impl Default for AnonymousAuth {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl IdentityProvider for AnonymousAuth {
  fn current_identity(&self) -> Option<Identity> {
    self.state.borrow().clone()
  }

  #[instrument(name = "anonymous_auth::sign_in", skip(self))]
  async fn sign_in_anonymously(&self) -> Result<()> {
    if self.state.borrow().is_some() {
      return Ok(());
    }
    let issued = match &self.registry {
      Some(registry) => registry.issue(),
      None => Identity::generate(),
    };
    let uid = issued.uid().to_string();
    let changed = self.state.send_if_modified(|current| {
      if current.is_none() {
        *current = Some(issued);
        true
      } else {
        false
      }
    });
    if changed {
      debug!(%uid, "Issued anonymous identity.");
    }
    Ok(())
  }

  fn watch_auth_state(&self) -> watch::Receiver<Option<Identity>> {
    self.state.subscribe()
  }
}
