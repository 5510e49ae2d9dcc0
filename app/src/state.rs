// app/src/state.rs

use crate::backend::Backend;
use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::identity::{AnonymousAuth, Identity, SessionRegistry};
use crate::pipelines::register_all_pipelines;
use crate::store::{DocumentStore, MemoryStore, PgDocumentStore};
use patungan_flow::Registry;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
  /// Store only; identity is attached per request in [`AppState::backend_for`].
  pub backend: Backend,
  pub flows: Arc<Registry<AppError>>,
  /// `None` when anonymous sign-in is disabled.
  pub sessions: Option<Arc<SessionRegistry>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Connects the configured store and registers all pipelines.
  pub async fn from_config(config: AppConfig) -> Result<Self> {
    let store: Option<Arc<dyn DocumentStore>> = match &config.store {
      StoreBackend::Memory => {
        info!("Using the in-memory document store.");
        Some(Arc::new(MemoryStore::new()))
      }
      StoreBackend::Postgres { database_url } => {
        let store = PgDocumentStore::connect(database_url).await?;
        Some(Arc::new(store))
      }
      StoreBackend::Disabled => {
        warn!("No document store configured; order operations will report backend-unavailable.");
        None
      }
    };
    Ok(Self::new(store, config))
  }

  pub fn new(store: Option<Arc<dyn DocumentStore>>, config: AppConfig) -> Self {
    let backend = match store {
      Some(store) => Backend::unconfigured().with_store(store),
      None => Backend::unconfigured(),
    };
    let flows = Arc::new(Registry::<AppError>::new());
    register_all_pipelines(&flows);
    let sessions = config
      .anonymous_auth
      .then(|| Arc::new(SessionRegistry::with_limits(config.session_capacity, config.session_idle_timeout)));
    Self {
      backend,
      flows,
      sessions,
      config: Arc::new(config),
    }
  }

  /// The backend as seen by one caller: the shared store plus an identity
  /// provider restored to `caller`.
  pub fn backend_for(&self, caller: Option<Identity>) -> Backend {
    match &self.sessions {
      Some(sessions) => self
        .backend
        .clone()
        .with_auth(Arc::new(AnonymousAuth::with_registry(sessions.clone(), caller))),
      None => self.backend.clone(),
    }
  }
}
