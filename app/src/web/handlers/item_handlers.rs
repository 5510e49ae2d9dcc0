// app/src/web/handlers/item_handlers.rs

use crate::errors::AppError;
use crate::pipelines::submit_item;
use crate::schemas::AddItemForm;
use crate::services::watch_order_items;
use crate::state::AppState;
use crate::web::Caller;
use actix_web::{http::header, web, HttpResponse};
use futures_util::StreamExt;
use serde_json::json;
use tracing::{info, instrument};

#[instrument(name = "handler::upsert_item", skip(app_state, caller, form))]
pub async fn upsert_item_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<String>,
  form: web::Json<AddItemForm>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let backend = app_state.backend_for(caller.identity);
  let outcome = submit_item(&app_state.flows, backend, &order_id, form.into_inner()).await?;

  info!(%order_id, uid = outcome.id(), created = outcome.was_created(), "Item saved via HTTP.");
  Ok(HttpResponse::Ok().json(json!({
    "id": outcome.id(),
    "created": outcome.was_created(),
  })))
}

/// Server-sent events: one `data:` frame with the full item list per snapshot.
#[instrument(name = "handler::stream_items", skip(app_state))]
pub async fn stream_items_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let snapshots = watch_order_items(&app_state.backend, &order_id).await?;
  let frames = snapshots.map(|items| serde_json::to_string(&items).map(|json| web::Bytes::from(format!("data: {}\n\n", json))));

  Ok(
    HttpResponse::Ok()
      .content_type("text/event-stream")
      .insert_header((header::CACHE_CONTROL, "no-cache"))
      .streaming(frames),
  )
}
