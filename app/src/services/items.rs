// app/src/services/items.rs

use super::items_collection;
use crate::backend::Backend;
use crate::errors::Result;
use crate::models::{ItemLine, OrderDetailItem, UpsertOutcome};
use crate::schemas::ItemSubmission;
use crate::store::DocumentWrite;
use chrono::Utc;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// Full item lists, one per store snapshot.
pub type ItemSnapshots = BoxStream<'static, Vec<OrderDetailItem>>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemFields<'a> {
  participant_name: &'a str,
  note: Option<&'a str>,
  items: &'a [ItemLine],
}

/// Creates or updates the caller's item document under the order.
///
/// The read and the write are separate round trips, so two concurrent
/// submissions from one identity race and the last write wins. The order
/// itself is not looked up.
#[instrument(name = "items::upsert_order_item", skip(backend, submission), err(Display))]
pub async fn upsert_order_item(backend: &Backend, order_id: &str, submission: &ItemSubmission) -> Result<UpsertOutcome> {
  let store = backend.store()?;
  let caller = backend.current_identity()?;
  let path = items_collection(order_id)?.doc(caller.uid());

  let existing = store.get(&path).await?;
  let write = DocumentWrite::from_serialize(&ItemFields {
    participant_name: &submission.participant_name,
    note: submission.note.as_deref(),
    items: &submission.items,
  })?;

  // TODO: replace the read-then-branch with a conditional create once the store trait has one.
  let outcome = match existing {
    None => {
      let write = write
        .set_field("createdBy", caller.uid())
        .server_timestamp("createdAt")
        .server_timestamp("updatedAt");
      store.set(&path, write).await?;
      UpsertOutcome::Created(caller.uid().to_string())
    }
    Some(_) => {
      store.merge(&path, write.server_timestamp("updatedAt")).await?;
      UpsertOutcome::Updated(caller.uid().to_string())
    }
  };
  info!(%order_id, uid = %caller, created = outcome.was_created(), "Order item saved.");
  Ok(outcome)
}

/// Live item list of an order: the current state first, then one list per
/// change. Dropping the stream detaches the listener.
#[instrument(name = "items::watch_order_items", skip(backend), err(Display))]
pub async fn watch_order_items(backend: &Backend, order_id: &str) -> Result<ItemSnapshots> {
  let store = backend.store()?;
  let snapshots = store.subscribe(&items_collection(order_id)?).await?;
  debug!(%order_id, "Item subscription attached.");
  Ok(
    snapshots
      .map(|snapshot| {
        let delivered_at = Utc::now();
        snapshot
          .documents
          .iter()
          .map(|doc| OrderDetailItem::from_document(doc, delivered_at))
          .collect()
      })
      .boxed(),
  )
}

/// Handle of a callback subscription. Dropping it also detaches.
#[must_use = "dropping the handle ends the subscription"]
pub struct Unsubscribe {
  task: JoinHandle<()>,
}

impl Unsubscribe {
  pub fn unsubscribe(self) {
    self.task.abort();
  }

  pub fn is_active(&self) -> bool {
    !self.task.is_finished()
  }
}

impl Drop for Unsubscribe {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Callback form of [`watch_order_items`]. `on_items` runs on a spawned task
/// for every snapshot until the handle is released.
pub async fn subscribe_order_items<F>(backend: &Backend, order_id: &str, mut on_items: F) -> Result<Unsubscribe>
where
  F: FnMut(Vec<OrderDetailItem>) + Send + 'static,
{
  let mut snapshots = watch_order_items(backend, order_id).await?;
  let order_id = order_id.to_string();
  let task = tokio::spawn(async move {
    while let Some(items) = snapshots.next().await {
      on_items(items);
    }
    debug!(%order_id, "Item subscription ended.");
  });
  Ok(Unsubscribe { task })
}
