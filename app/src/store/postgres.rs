// app/src/store/postgres.rs

use super::{
  CollectionPath, Document, DocumentPath, DocumentStore, DocumentWrite, Fields, QuerySnapshot, ServerClock,
  SnapshotStream, StoreResult,
};
use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde_json::Value;
use sqlx::postgres::{PgListener, PgPool, PgPoolOptions};
use sqlx::types::Json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

const NOTIFY_CHANNEL: &str = "patungan_documents";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
  collection TEXT NOT NULL,
  id TEXT NOT NULL,
  fields JSONB NOT NULL DEFAULT '{}'::jsonb,
  PRIMARY KEY (collection, id)
)
"#;

const UPSERT_REPLACE: &str = r#"
INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
ON CONFLICT (collection, id) DO UPDATE SET fields = EXCLUDED.fields
"#;

const UPSERT_MERGE: &str = r#"
INSERT INTO documents (collection, id, fields) VALUES ($1, $2, $3)
ON CONFLICT (collection, id) DO UPDATE SET fields = documents.fields || EXCLUDED.fields
"#;

/// Documents stored as JSONB rows in one `documents` table. Changes are
/// broadcast with `pg_notify` carrying the collection path.
pub struct PgDocumentStore {
  pool: PgPool,
  clock: ServerClock,
}

impl PgDocumentStore {
  pub fn new(pool: PgPool) -> Self {
    Self {
      pool,
      clock: ServerClock::new(),
    }
  }

  pub async fn connect(database_url: &str) -> StoreResult<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Connected to the document database.");
    let store = Self::new(pool);
    store.ensure_schema().await?;
    Ok(store)
  }

  pub async fn ensure_schema(&self) -> StoreResult<()> {
    sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
    Ok(())
  }

  async fn load(pool: &PgPool, collection: &CollectionPath) -> StoreResult<QuerySnapshot> {
    let rows: Vec<(String, Json<Fields>)> =
      sqlx::query_as("SELECT id, fields FROM documents WHERE collection = $1 ORDER BY id")
        .bind(collection.as_str())
        .fetch_all(pool)
        .await?;
    Ok(QuerySnapshot {
      documents: rows
        .into_iter()
        .map(|(id, Json(fields))| Document { id, fields })
        .collect(),
    })
  }

  async fn listen(pool: &PgPool) -> StoreResult<PgListener> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(NOTIFY_CHANNEL).await?;
    Ok(listener)
  }

  async fn write(&self, statement: &str, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()> {
    let fields = write.resolve(self.clock.tick())?;
    let mut tx = self.pool.begin().await?;
    sqlx::query(statement)
      .bind(path.collection().as_str())
      .bind(path.id())
      .bind(Json(Value::Object(fields)))
      .execute(&mut *tx)
      .await?;
    sqlx::query("SELECT pg_notify($1, $2)")
      .bind(NOTIFY_CHANNEL)
      .bind(path.collection().as_str())
      .execute(&mut *tx)
      .await?;
    tx.commit().await?;
    Ok(())
  }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
  #[instrument(name = "pg_store::insert", skip(self, write), fields(collection = %collection), err(Display))]
  async fn insert(&self, collection: &CollectionPath, write: DocumentWrite) -> StoreResult<String> {
    let id = Uuid::new_v4().simple().to_string();
    self.write(UPSERT_REPLACE, &collection.doc(&id), write).await?;
    Ok(id)
  }

  #[instrument(name = "pg_store::get", skip(self), fields(path = %path), err(Display))]
  async fn get(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
    let row: Option<(Json<Fields>,)> =
      sqlx::query_as("SELECT fields FROM documents WHERE collection = $1 AND id = $2")
        .bind(path.collection().as_str())
        .bind(path.id())
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(|(Json(fields),)| Document {
      id: path.id().to_string(),
      fields,
    }))
  }

  #[instrument(name = "pg_store::set", skip(self, write), fields(path = %path), err(Display))]
  async fn set(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()> {
    self.write(UPSERT_REPLACE, path, write).await
  }

  #[instrument(name = "pg_store::merge", skip(self, write), fields(path = %path), err(Display))]
  async fn merge(&self, path: &DocumentPath, write: DocumentWrite) -> StoreResult<()> {
    self.write(UPSERT_MERGE, path, write).await
  }

  #[instrument(name = "pg_store::subscribe", skip(self), fields(collection = %collection), err(Display))]
  async fn subscribe(&self, collection: &CollectionPath) -> StoreResult<SnapshotStream> {
    // Listen before the first load so no commit falls between the two.
    let listener = Self::listen(&self.pool).await?;
    let initial = Self::load(&self.pool, collection).await?;

    let pool = self.pool.clone();
    let collection = collection.clone();
    let snapshots = stream::unfold((listener, Some(initial)), move |(mut listener, pending)| {
      let pool = pool.clone();
      let collection = collection.clone();
      async move {
        if let Some(snapshot) = pending {
          return Some((snapshot, (listener, None)));
        }
        loop {
          // Notifications sent while the connection was down are lost, so a
          // dropped or failed listener is replaced and the collection reloaded.
          let resubscribe = match listener.try_recv().await {
            Ok(Some(notification)) if notification.payload() == collection.as_str() => false,
            Ok(Some(_)) => continue,
            Ok(None) => {
              warn!(collection = %collection, "Change listener lost its connection; resubscribing.");
              true
            }
            Err(e) => {
              warn!(error = %e, collection = %collection, "Change listener failed; resubscribing.");
              true
            }
          };
          if resubscribe {
            match Self::listen(&pool).await {
              Ok(fresh) => listener = fresh,
              Err(e) => {
                warn!(error = %e, collection = %collection, "Resubscribing failed; closing subscription.");
                return None;
              }
            }
          }
          return match Self::load(&pool, &collection).await {
            Ok(snapshot) => Some((snapshot, (listener, None))),
            Err(e) => {
              warn!(error = %e, collection = %collection, "Reloading collection failed; closing subscription.");
              None
            }
          };
        }
      }
    });
    Ok(snapshots.boxed())
  }
}
