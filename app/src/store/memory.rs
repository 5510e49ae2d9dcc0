// app/src/store/memory.rs

use super::{
  CollectionPath, Document, DocumentPath, DocumentStore, DocumentWrite, Fields, QuerySnapshot, ServerClock,
  SnapshotStream, StoreResult,
};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::watch;
use tracing::{debug, instrument};
use uuid::Uuid;

type Collection = BTreeMap<String, Fields>;

/// In-process document store. Writes are published to subscribers of the
/// touched collection before the write call returns.
#[derive(Default)]
pub struct MemoryStore {
  collections: RwLock<HashMap<CollectionPath, Collection>>,
  // Locked only while `collections` is held, never the other way around.
  channels: Mutex<HashMap<CollectionPath, watch::Sender<QuerySnapshot>>>,
  clock: ServerClock,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn snapshot_of(collection: Option<&Collection>) -> QuerySnapshot {
    let documents = collection
      .map(|docs| {
        docs
          .iter()
          .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
          })
          .collect()
      })
      .unwrap_or_default();
    QuerySnapshot { documents }
  }

  fn publish(&self, path: &CollectionPath, collection: &Collection) {
    let mut channels = self.channels.lock();
    let Some(sender) = channels.get(path) else {
      return;
    };
    if sender.receiver_count() == 0 {
      channels.remove(path);
      debug!(collection = %path, "Dropped channel with no subscribers.");
      return;
    }
    sender.send_replace(Self::snapshot_of(Some(collection)));
  }

  fn write_with<F>(&self, path: &DocumentPath, write: DocumentWrite, apply: F) -> StoreResult<()>
  where
    F: FnOnce(&mut Collection, Fields),
  {
    let mut collections = self.collections.write();
    let fields = write.resolve(self.clock.tick())?;
    let collection = collections.entry(path.collection().clone()).or_default();
    apply(collection, fields);
    self.publish(path.collection(), collection);
    Ok(())
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  #[instrument(name = "memory_store::insert", skip(self, write), fields(collection = %collection))]
  async fn insert(&self, collection: &CollectionPath, write: DocumentWrite) -> StoreResult<String> {
    let id = Uuid::new_v4().simple().to_string();
    self.write_with(&collection.doc(&id), write, |docs, fields| {
      docs.insert(id.clone(), fields);
    })?;
    Ok(id)
  }

  async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
    let collections = self.collections.read();
    Ok(
      collections
        .get(path.collection())
        .and_then(|docs| docs.get(path.id()))
        .map(|fields| Document {
          id: path.id().to_string(),
          fields: fields.clone(),
        }),
    )
  }

  #[instrument(name = "memory_store::set", skip(self, write), fields(path = %path))]
  async fn set(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()> {
    self.write_with(path, write, |docs, fields| {
      docs.insert(path.id().to_string(), fields);
    })
  }

  #[instrument(name = "memory_store::merge", skip(self, write), fields(path = %path))]
  async fn merge(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()> {
    self.write_with(path, write, |docs, fields| {
      docs.entry(path.id().to_string()).or_default().extend(fields);
    })
  }

  async fn subscribe(&self, collection: &CollectionPath) -> StoreResult<SnapshotStream> {
    let mut receiver = {
      let collections = self.collections.read();
      let current = Self::snapshot_of(collections.get(collection));
      let mut channels = self.channels.lock();
      match channels.get(collection) {
        Some(sender) => {
          sender.send_if_modified(|held| {
            if *held != current {
              *held = current;
              true
            } else {
              false
            }
          });
          sender.subscribe()
        }
        None => {
          let (sender, receiver) = watch::channel(current);
          channels.insert(collection.clone(), sender);
          receiver
        }
      }
    };
    debug!(collection = %collection, "Subscriber attached.");

    let first = receiver.borrow_and_update().clone();
    let snapshots = stream::unfold((receiver, Some(first)), |(mut receiver, pending)| async move {
      if let Some(snapshot) = pending {
        return Some((snapshot, (receiver, None)));
      }
      match receiver.changed().await {
        Ok(()) => {
          let snapshot = receiver.borrow_and_update().clone();
          Some((snapshot, (receiver, None)))
        }
        Err(_) => None,
      }
    });
    Ok(snapshots.boxed())
  }
}
