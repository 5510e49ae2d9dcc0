// app/src/identity/sessions.rs

use super::Identity;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_SESSION_CAPACITY: usize = 10_000;
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug)]
struct Session {
  last_seen: Instant,
  // Recency order; `Instant` can repeat between quick calls.
  tick: u64,
}

#[derive(Debug, Default)]
struct Sessions {
  by_identity: HashMap<Identity, Session>,
  next_tick: u64,
}

impl Sessions {
  fn stamp(&mut self) -> Session {
    self.next_tick += 1;
    Session {
      last_seen: Instant::now(),
      tick: self.next_tick,
    }
  }
}

/// Identities issued by this server. A bearer token is valid only if it
/// names one of them and was seen within the idle timeout. At most
/// `capacity` sessions are kept; the least recently seen one makes room.
#[derive(Debug)]
pub struct SessionRegistry {
  sessions: Mutex<Sessions>,
  capacity: usize,
  idle_timeout: Duration,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::with_limits(DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT)
  }

  pub fn with_limits(capacity: usize, idle_timeout: Duration) -> Self {
    Self {
      sessions: Mutex::new(Sessions::default()),
      capacity: capacity.max(1),
      idle_timeout,
    }
  }

  pub fn issue(&self) -> Identity {
    let identity = Identity::generate();
    let mut sessions = self.sessions.lock();
    if sessions.by_identity.len() >= self.capacity {
      let idle_timeout = self.idle_timeout;
      sessions
        .by_identity
        .retain(|_, session| session.last_seen.elapsed() < idle_timeout);
    }
    if sessions.by_identity.len() >= self.capacity {
      let oldest = sessions
        .by_identity
        .iter()
        .min_by_key(|(_, session)| session.tick)
        .map(|(identity, _)| identity.clone());
      if let Some(oldest) = oldest {
        debug!(evicted = %oldest, "Session registry full; evicting least recently seen.");
        sessions.by_identity.remove(&oldest);
      }
    }
    let session = sessions.stamp();
    sessions.by_identity.insert(identity.clone(), session);
    identity
  }

  /// The identity named by `token`, refreshing its last-seen time.
  pub fn resolve(&self, token: &str) -> Option<Identity> {
    let candidate = Identity::new(token.trim());
    let mut sessions = self.sessions.lock();
    let expired = sessions
      .by_identity
      .get(&candidate)
      .map(|session| session.last_seen.elapsed() >= self.idle_timeout)?;
    if expired {
      sessions.by_identity.remove(&candidate);
      return None;
    }
    let session = sessions.stamp();
    sessions.by_identity.insert(candidate.clone(), session);
    Some(candidate)
  }

  pub fn len(&self) -> usize {
    self.sessions.lock().by_identity.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.lock().by_identity.is_empty()
  }
}

impl Default for SessionRegistry {
  fn default() -> Self {
    Self::new()
  }
}
