// app/src/pipelines/mod.rs

//! The application's two data-flow pipelines and their registration.

use crate::errors::AppError;
use patungan_flow::Registry;

pub mod add_item_pipeline;
pub mod contexts;
pub mod create_order_pipeline;

pub use add_item_pipeline::submit_item;
pub use create_order_pipeline::submit_order;

/// Registers every pipeline with `flows`. Called once at startup.
pub fn register_all_pipelines(flows: &Registry<AppError>) {
  tracing::info!("Registering pipelines...");
  create_order_pipeline::register_create_order_pipeline(flows);
  add_item_pipeline::register_add_item_pipeline(flows);
  tracing::info!("All application pipelines registered.");
}
