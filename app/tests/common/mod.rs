// app/tests/common/mod.rs
#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Utc};
use futures_util::{Stream, StreamExt};
use once_cell::sync::Lazy;
use patungan::identity::{AnonymousAuth, Identity};
use patungan::schemas::{AddItemForm, CreateOrderForm, DeadlineInput, ItemLineForm};
use patungan::store::MemoryStore;
use patungan::Backend;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Backend over `store` with `uid` already signed in.
pub fn signed_in(store: &Arc<MemoryStore>, uid: &str) -> Backend {
  Backend::new(store.clone(), Arc::new(AnonymousAuth::restore(Identity::new(uid))))
}

/// Backend over `store` with an identity provider but nobody signed in.
pub fn signed_out(store: &Arc<MemoryStore>) -> Backend {
  Backend::new(store.clone(), Arc::new(AnonymousAuth::new()))
}

pub fn millis_from_now(offset: ChronoDuration) -> i64 {
  (Utc::now() + offset).timestamp_millis()
}

pub fn order_form(name: &str, max_participants: i64, deadline_millis: Option<i64>) -> CreateOrderForm {
  CreateOrderForm {
    order_name: name.to_string(),
    order_description: None,
    max_participants,
    last_order_at: deadline_millis.map(DeadlineInput::Millis),
  }
}

pub fn bubble_tea_order() -> CreateOrderForm {
  order_form("Order Bubble Tea", 5, Some(millis_from_now(ChronoDuration::hours(1))))
}

pub fn item_form(participant: &str, lines: &[(&str, i64)]) -> AddItemForm {
  AddItemForm {
    participant_name: participant.to_string(),
    items: lines
      .iter()
      .map(|(name, quantity)| ItemLineForm {
        item_name: name.to_string(),
        quantity: *quantity,
      })
      .collect(),
    note: None,
  }
}

/// Next stream item, failing the test if none arrives within a second.
pub async fn next_within<S, T>(stream: &mut S) -> T
where
  S: Stream<Item = T> + Unpin,
{
  tokio::time::timeout(Duration::from_secs(1), stream.next())
    .await
    .expect("timed out waiting for the next item")
    .expect("stream ended")
}
