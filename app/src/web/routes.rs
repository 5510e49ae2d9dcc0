// app/src/web/routes.rs

use crate::errors::AppError;
use crate::schemas::FieldErrors;
use crate::web::handlers::{item_handlers, order_handlers, session_handlers};
use actix_web::{web, HttpResponse};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    tracing::debug!(error = %err, "Rejected request body.");
    let mut fields = FieldErrors::default();
    fields.insert("body", "invalid-payload", "Please check the form and try again.");
    AppError::Validation(fields).into()
  })
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(json_config())
      .route("/health", web::get().to(health_check_handler))
      .route("/session", web::post().to(session_handlers::start_session_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/items", web::put().to(item_handlers::upsert_item_handler))
          .route("/{order_id}/items/stream", web::get().to(item_handlers::stream_items_handler)),
      ),
  );
}
