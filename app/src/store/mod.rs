// app/src/store/mod.rs

//! Document-store abstraction: collections of JSON documents addressed by
//! slash-separated paths, with server-assigned timestamps and live snapshot
//! subscriptions.

pub mod memory;
pub mod postgres;
pub mod timestamp;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use timestamp::{ServerClock, Timestamp};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub type Fields = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Sqlx(#[source] sqlx::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Document for '{0}' must serialize to a JSON object")]
  NotAnObject(String),

  #[error("Document store is closed")]
  Closed,
}

impl From<sqlx::Error> for StoreError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::PoolClosed => StoreError::Closed,
      other => StoreError::Sqlx(other),
    }
  }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Path of a collection, e.g. `orders` or `orders/abc/items`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
  pub fn root(name: &str) -> Self {
    Self(name.to_string())
  }

  pub fn doc(&self, id: &str) -> DocumentPath {
    DocumentPath {
      collection: self.clone(),
      id: id.to_string(),
    }
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CollectionPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
  collection: CollectionPath,
  id: String,
}

impl DocumentPath {
  pub fn collection(&self) -> &CollectionPath {
    &self.collection
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Collection nested under this document, e.g. `orders/{id}/items`.
  pub fn sub_collection(&self, name: &str) -> CollectionPath {
    CollectionPath(format!("{}/{}/{}", self.collection.0, self.id, name))
  }
}

impl fmt::Display for DocumentPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.collection, self.id)
  }
}

/// A stored document as read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub fields: Fields,
}

impl Document {
  pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
  }
}

/// Fields to write, plus the names of fields the store fills with its own clock.
#[derive(Debug, Clone, Default)]
pub struct DocumentWrite {
  fields: Fields,
  server_timestamps: Vec<String>,
}

impl DocumentWrite {
  pub fn from_serialize<T: Serialize>(value: &T) -> StoreResult<Self> {
    match serde_json::to_value(value)? {
      Value::Object(fields) => Ok(Self {
        fields,
        server_timestamps: Vec::new(),
      }),
      other => Err(StoreError::NotAnObject(other.to_string())),
    }
  }

  pub fn set_field(mut self, name: &str, value: impl Into<Value>) -> Self {
    self.fields.insert(name.to_string(), value.into());
    self
  }

  /// Marks `name` to be set to the store's commit time.
  pub fn server_timestamp(mut self, name: &str) -> Self {
    self.fields.remove(name);
    self.server_timestamps.push(name.to_string());
    self
  }

  /// Final field map with every pending server timestamp filled in with `now`.
  pub fn resolve(self, now: Timestamp) -> StoreResult<Fields> {
    let mut fields = self.fields;
    if !self.server_timestamps.is_empty() {
      let stamp = serde_json::to_value(now)?;
      for name in self.server_timestamps {
        fields.insert(name, stamp.clone());
      }
    }
    Ok(fields)
  }
}

/// Every document of a collection at one point in time, ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySnapshot {
  pub documents: Vec<Document>,
}

pub type SnapshotStream = BoxStream<'static, QuerySnapshot>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Adds a document under a generated id and returns that id.
  async fn insert(&self, collection: &CollectionPath, write: DocumentWrite) -> StoreResult<String>;

  async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

  /// Creates or fully replaces the document.
  async fn set(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()>;

  /// Overwrites only the given fields, creating the document if absent.
  async fn merge(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()>;

  /// Current snapshot of the collection, then a new one after every change.
  async fn subscribe(&self, collection: &CollectionPath) -> StoreResult<SnapshotStream>;
}
