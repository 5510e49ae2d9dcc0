// app/tests/web_tests.rs
mod common;

use actix_web::body::MessageBody;
use actix_web::{http::StatusCode, test, web, App};
use chrono::Duration;
use common::*;
use patungan::config::{AppConfig, StoreBackend};
use patungan::state::AppState;
use patungan::store::MemoryStore;
use patungan::web::configure_app_routes;
use serde_json::{json, Value};
use std::sync::Arc;

fn config(store: StoreBackend, anonymous_auth: bool) -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    store,
    anonymous_auth,
    session_capacity: 100,
    session_idle_timeout: std::time::Duration::from_secs(3600),
  }
}

fn memory_state() -> AppState {
  AppState::new(Some(Arc::new(MemoryStore::new())), config(StoreBackend::Memory, true))
}

fn order_body() -> Value {
  json!({
    "orderName": "Order Bubble Tea",
    "maxParticipants": 5,
    "lastOrderAt": millis_from_now(Duration::hours(1)),
  })
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state))
        .configure(configure_app_routes),
    )
    .await
  };
}

macro_rules! start_session {
  ($app:expr) => {{
    let req = test::TestRequest::post().uri("/api/v1/session").to_request();
    let body: Value = test::call_and_read_body_json($app, req).await;
    body["uid"].as_str().unwrap().to_string()
  }};
}

#[actix_web::test]
async fn health_reports_ok() {
  setup_tracing();
  let app = app!(memory_state());
  let req = test::TestRequest::get().uri("/api/v1/health").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_web::test]
async fn sessions_are_issued_then_confirmed() {
  setup_tracing();
  let app = app!(memory_state());

  let req = test::TestRequest::post().uri("/api/v1/session").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let uid = body["uid"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri("/api/v1/session")
    .insert_header(("Authorization", format!("Bearer {}", uid)))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["uid"], uid.as_str());
}

#[actix_web::test]
async fn anonymous_sign_ins_keep_the_session_registry_bounded() {
  setup_tracing();
  let state = memory_state();
  let sessions = state.sessions.clone().unwrap();
  for _ in 0..1_000 {
    patungan::ensure_anonymous_identity(&state.backend_for(None)).await.unwrap();
  }
  assert_eq!(sessions.len(), 100);

  let app = app!(state);
  for _ in 0..50 {
    start_session!(&app);
  }
  assert_eq!(sessions.len(), 100);
  let newest = start_session!(&app);
  let req = test::TestRequest::post()
    .uri("/api/v1/session")
    .insert_header(("Authorization", format!("Bearer {}", newest)))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn creating_an_order_requires_a_session() {
  setup_tracing();
  let app = app!(memory_state());

  let req = test::TestRequest::post().uri("/api/v1/orders").set_json(order_body()).to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "unauthenticated");

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(("Authorization", "Bearer never-issued"))
    .set_json(order_body())
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn order_lifecycle_over_http() {
  setup_tracing();
  let app = app!(memory_state());
  let uid = start_session!(&app);
  let bearer = ("Authorization", format!("Bearer {}", uid));

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(bearer.clone())
    .set_json(order_body())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let created: Value = test::read_body_json(resp).await;
  let order_id = created["id"].as_str().unwrap().to_string();

  let req = test::TestRequest::get().uri(&format!("/api/v1/orders/{}", order_id)).to_request();
  let detail: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(detail["id"], order_id.as_str());
  assert_eq!(detail["participantsCount"], 0);
  assert_eq!(detail["maxParticipants"], 5);
  assert_eq!(detail["ownerUid"], uid.as_str());

  let item = json!({ "participantName": "Budi", "items": [{ "itemName": "Taro", "quantity": 1 }] });
  for expected_created in [true, false] {
    let req = test::TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/items", order_id))
      .insert_header(bearer.clone())
      .set_json(&item)
      .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["id"], uid.as_str());
    assert_eq!(body["created"], expected_created);
  }
}

#[actix_web::test]
async fn invalid_forms_return_field_errors() {
  setup_tracing();
  let app = app!(memory_state());
  let uid = start_session!(&app);

  let req = test::TestRequest::put()
    .uri("/api/v1/orders/o1/items")
    .insert_header(("Authorization", format!("Bearer {}", uid)))
    .set_json(json!({ "participantName": "Budi", "items": [{ "itemName": "", "quantity": 0 }] }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation-failed");
  assert_eq!(body["field"], "items");
  assert_eq!(body["message"], "Item name is required");
  assert_eq!(body["fields"]["items[0].quantity"], "Quantity must be at least 1");
}

#[actix_web::test]
async fn malformed_json_is_a_validation_failure() {
  setup_tracing();
  let app = app!(memory_state());
  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(("content-type", "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn unknown_orders_are_404() {
  setup_tracing();
  let app = app!(memory_state());
  let req = test::TestRequest::get().uri("/api/v1/orders/nope").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "not-found");
}

#[actix_web::test]
async fn disabled_store_is_503() {
  setup_tracing();
  let app = app!(AppState::new(None, config(StoreBackend::Disabled, true)));
  let uid = start_session!(&app);

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header(("Authorization", format!("Bearer {}", uid)))
    .set_json(order_body())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "backend-unavailable");
}

#[actix_web::test]
async fn disabled_anonymous_auth_refuses_sessions() {
  setup_tracing();
  let app = app!(AppState::new(
    Some(Arc::new(MemoryStore::new())),
    config(StoreBackend::Memory, false)
  ));
  let req = test::TestRequest::post().uri("/api/v1/session").to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn item_stream_sends_the_current_list_first() {
  setup_tracing();
  let app = app!(memory_state());
  let req = test::TestRequest::get().uri("/api/v1/orders/o1/items/stream").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get("content-type").unwrap(), "text/event-stream");

  let mut body = resp.into_body();
  let frame = tokio::time::timeout(
    std::time::Duration::from_secs(1),
    futures_util::future::poll_fn(|cx| std::pin::Pin::new(&mut body).poll_next(cx)),
  )
  .await
  .unwrap()
  .unwrap()
  .unwrap();
  assert_eq!(&frame[..], b"data: []\n\n");
}
