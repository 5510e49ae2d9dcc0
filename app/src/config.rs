// app/src/config.rs

use crate::errors::{AppError, Result};
use crate::identity::sessions::{DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which document store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres { database_url: String },
  /// Store deliberately or accidentally unconfigured; operations report `backend-unavailable`.
  Disabled,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store: StoreBackend,
  /// Whether the service issues anonymous identities.
  pub anonymous_auth: bool,
  /// Most anonymous sessions kept at once.
  pub session_capacity: usize,
  pub session_idle_timeout: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_var(&lookup, "SERVER_PORT", 8080u16)?;
    let anonymous_auth = parse_var(&lookup, "ANONYMOUS_AUTH", true)?;
    let session_capacity = parse_var(&lookup, "SESSION_CAPACITY", DEFAULT_SESSION_CAPACITY)?;
    if session_capacity == 0 {
      return Err(AppError::Config("SESSION_CAPACITY must be at least 1".to_string()));
    }
    let session_idle_timeout = Duration::from_secs(parse_var(
      &lookup,
      "SESSION_IDLE_SECS",
      DEFAULT_SESSION_IDLE_TIMEOUT.as_secs(),
    )?);

    let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("memory") {
      "memory" => StoreBackend::Memory,
      "none" => StoreBackend::Disabled,
      "postgres" => match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
        Some(database_url) => StoreBackend::Postgres { database_url },
        None => {
          tracing::warn!("STORE_BACKEND=postgres but DATABASE_URL is not set; running without a document store.");
          StoreBackend::Disabled
        }
      },
      other => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND '{}': expected memory, postgres or none",
          other
        )))
      }
    };

    tracing::info!(?store, anonymous_auth, session_capacity, "Application configuration loaded.");
    Ok(Self {
      server_host,
      server_port,
      store,
      anonymous_auth,
      session_capacity,
      session_idle_timeout,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(name) {
    None => Ok(default),
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
  }
}
