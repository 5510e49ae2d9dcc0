// app/src/web/handlers/order_handlers.rs

use crate::errors::AppError;
use crate::pipelines::submit_order;
use crate::schemas::CreateOrderForm;
use crate::services::get_detail_order;
use crate::state::AppState;
use crate::web::Caller;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

#[instrument(name = "handler::create_order", skip(app_state, caller, form), fields(order_name = %form.order_name))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  form: web::Json<CreateOrderForm>,
) -> Result<HttpResponse, AppError> {
  let backend = app_state.backend_for(caller.identity);
  let order_id = submit_order(&app_state.flows, backend, form.into_inner())
    .await
    .map_err(AppError::for_order_creation)?;

  info!(%order_id, "Order created via HTTP.");
  Ok(HttpResponse::Created().json(json!({ "id": order_id })))
}

#[instrument(name = "handler::get_order", skip(app_state))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let detail = get_detail_order(&app_state.backend, &order_id).await?;
  Ok(HttpResponse::Ok().json(detail))
}
