// app/src/store/timestamp.rs

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Store-native instant: whole seconds since the epoch plus nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
  pub seconds: i64,
  pub nanos: u32,
}

impl Timestamp {
  pub fn now() -> Self {
    Self::from_datetime(Utc::now())
  }

  pub fn from_datetime(at: DateTime<Utc>) -> Self {
    Self {
      seconds: at.timestamp(),
      nanos: at.timestamp_subsec_nanos(),
    }
  }

  /// `None` when the instant is outside the representable range.
  pub fn from_millis(millis: i64) -> Option<Self> {
    DateTime::from_timestamp_millis(millis).map(Self::from_datetime)
  }

  pub fn to_datetime(self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(self.seconds, self.nanos)
  }

  fn next_nano(self) -> Self {
    if self.nanos >= 999_999_999 {
      Self {
        seconds: self.seconds + 1,
        nanos: 0,
      }
    } else {
      Self {
        seconds: self.seconds,
        nanos: self.nanos + 1,
      }
    }
  }
}

/// Hands out strictly increasing commit times.
#[derive(Debug, Default)]
pub struct ServerClock {
  last: Mutex<Option<Timestamp>>,
}

impl ServerClock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn tick(&self) -> Timestamp {
    let mut last = self.last.lock();
    let mut now = Timestamp::now();
    if let Some(prev) = *last {
      if now <= prev {
        now = prev.next_nano();
      }
    }
    *last = Some(now);
    now
  }
}
