// app/tests/postgres_store_tests.rs
//! Runs only when `PATUNGAN_TEST_DATABASE_URL` points at a disposable database.
mod common;

use common::*;
use patungan::store::{CollectionPath, DocumentStore, DocumentWrite, PgDocumentStore};
use serde_json::json;
use sqlx::postgres::PgPool;
use uuid::Uuid;

fn database_url() -> Option<String> {
  std::env::var("PATUNGAN_TEST_DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

#[tokio::test]
async fn subscription_recovers_writes_made_while_its_listener_was_down() {
  setup_tracing();
  let Some(url) = database_url() else {
    eprintln!("PATUNGAN_TEST_DATABASE_URL not set; skipping.");
    return;
  };
  let store = PgDocumentStore::connect(&url).await.unwrap();
  let admin = PgPool::connect(&url).await.unwrap();
  let items = CollectionPath::root("orders")
    .doc(&Uuid::new_v4().simple().to_string())
    .sub_collection("items");

  let mut snapshots = store.subscribe(&items).await.unwrap();
  assert!(next_within(&mut snapshots).await.documents.is_empty());

  sqlx::query(
    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
     WHERE query ILIKE 'LISTEN%' AND pid <> pg_backend_pid()",
  )
  .execute(&admin)
  .await
  .unwrap();

  let write = DocumentWrite::from_serialize(&json!({ "participantName": "Budi" })).unwrap();
  store.set(&items.doc("uid-1"), write).await.unwrap();

  let mut seen = Vec::new();
  for _ in 0..3 {
    let snapshot = next_within(&mut snapshots).await;
    seen = snapshot.documents.iter().map(|d| d.id.clone()).collect();
    if !seen.is_empty() {
      break;
    }
  }
  assert_eq!(seen, vec!["uid-1".to_string()]);
}
