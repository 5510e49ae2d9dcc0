// app/tests/order_flow_tests.rs
mod common;

use chrono::Duration;
use common::*;
use patungan::pipelines::{register_all_pipelines, submit_order};
use patungan::schemas::FieldErrors;
use patungan::services::ORDERS_COLLECTION;
use patungan::store::{CollectionPath, DocumentStore, MemoryStore};
use patungan::{create_group_order, get_detail_order, AppError, Backend};
use patungan_flow::Registry;
use std::sync::Arc;

fn flows() -> Registry<AppError> {
  let flows = Registry::new();
  register_all_pipelines(&flows);
  flows
}

async fn stored_order_count(store: &MemoryStore) -> usize {
  let mut snapshots = store.subscribe(&CollectionPath::root(ORDERS_COLLECTION)).await.unwrap();
  next_within(&mut snapshots).await.documents.len()
}

fn validation_code(err: &AppError, path: &str) -> String {
  match err {
    AppError::Validation(fields) => fields.get(path).map(|e| e.code.clone()).unwrap_or_default(),
    other => panic!("expected a validation error, got {:?}", other),
  }
}

#[tokio::test]
async fn creating_an_order_stores_owner_and_zero_participants() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let backend = signed_in(&store, "owner-1");
  let order = bubble_tea_order().validate_now().unwrap();

  let order_id = create_group_order(&backend, &order).await.unwrap();
  assert!(!order_id.is_empty());

  let doc = store
    .get(&CollectionPath::root(ORDERS_COLLECTION).doc(&order_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(doc.fields["participantsCount"], 0);
  assert_eq!(doc.fields["ownerUid"], "owner-1");
  assert!(doc.fields["createdAt"].is_object());
  assert_eq!(doc.fields["createdAt"], doc.fields["updatedAt"]);
}

#[tokio::test]
async fn bubble_tea_example_round_trips_through_the_pipeline() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let backend = signed_in(&store, "owner-1");

  let order_id = submit_order(&flows(), backend.clone(), bubble_tea_order()).await.unwrap();
  let detail = get_detail_order(&backend, &order_id).await.unwrap();

  assert_eq!(detail.id, order_id);
  assert_eq!(detail.order_name, "Order Bubble Tea");
  assert_eq!(detail.participants_count, 0);
  assert_eq!(detail.max_participants, 5);
  assert_eq!(detail.owner_uid, "owner-1");
  assert!(detail.last_order_at > detail.created_at);
}

#[tokio::test]
async fn past_deadline_is_rejected_without_writing() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let backend = signed_in(&store, "owner-1");
  let form = order_form("Lunch run", 3, Some(millis_from_now(-Duration::minutes(1))));

  let err = submit_order(&flows(), backend, form).await.unwrap_err();
  assert_eq!(validation_code(&err, "lastOrderAt"), "datetime-not-future");
  assert_eq!(err.target_field().as_deref(), Some("lastOrderAt"));
  assert_eq!(stored_order_count(&store).await, 0);
}

#[tokio::test]
async fn validation_runs_before_backend_checks() {
  setup_tracing();
  let err = submit_order(&flows(), Backend::unconfigured(), order_form("ab", 3, None))
    .await
    .unwrap_err();
  assert_eq!(err.code(), "validation-failed");
  assert_eq!(validation_code(&err, "orderName"), "too-short");
}

#[tokio::test]
async fn missing_store_is_reported_before_missing_identity() {
  setup_tracing();
  let order = bubble_tea_order().validate_now().unwrap();
  let err = create_group_order(&Backend::unconfigured(), &order).await.unwrap_err();
  assert_eq!(err.code(), "backend-unavailable");
}

#[tokio::test]
async fn unauthenticated_callers_cannot_create_orders() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let order = bubble_tea_order().validate_now().unwrap();

  let err = create_group_order(&signed_out(&store), &order).await.unwrap_err();
  assert_eq!(err.code(), "unauthenticated");

  let store_only = Backend::unconfigured().with_store(store.clone());
  let err = create_group_order(&store_only, &order).await.unwrap_err();
  assert_eq!(err.code(), "unauthenticated");
  assert_eq!(stored_order_count(&store).await, 0);
}

#[tokio::test]
async fn unknown_orders_are_not_found() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let backend = signed_in(&store, "owner-1");
  let err = get_detail_order(&backend, "does-not-exist").await.unwrap_err();
  assert_eq!(err.code(), "not-found");

  let err = get_detail_order(&backend, "a/b").await.unwrap_err();
  assert_eq!(err.code(), "not-found");
}

#[tokio::test]
async fn reading_needs_only_the_store() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let order = bubble_tea_order().validate_now().unwrap();
  let order_id = create_group_order(&signed_in(&store, "owner-1"), &order).await.unwrap();

  let anonymous_reader = Backend::unconfigured().with_store(store.clone());
  assert_eq!(get_detail_order(&anonymous_reader, &order_id).await.unwrap().id, order_id);
}

#[test]
fn field_errors_surface_the_first_form_field() {
  let errors = order_form("x", 500, None).validate_now().unwrap_err();
  let (path, first) = errors.first().unwrap();
  assert_eq!(path, "orderName");
  assert_eq!(first.message, "Order name must be at least 3 characters long");
  assert_eq!(errors.len(), 3);
  assert_eq!(FieldErrors::top_level("lastOrderAt"), "lastOrderAt");
}
