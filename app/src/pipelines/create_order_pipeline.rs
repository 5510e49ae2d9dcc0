// app/src/pipelines/create_order_pipeline.rs

use crate::backend::Backend;
use crate::errors::{AppError, Result};
use crate::pipelines::contexts::CreateOrderCtxData;
use crate::schemas::CreateOrderForm;
use crate::services::create_group_order;
use patungan_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use tracing::{info, instrument, warn};

pub const STEPS: &[&str] = &["validate_order_form", "write_order_document"];

pub fn build_create_order_pipeline() -> Pipeline<CreateOrderCtxData, AppError> {
  let mut p = Pipeline::<CreateOrderCtxData, AppError>::new(STEPS);
  p.on_root("validate_order_form", validate_order_form);
  p.on_root("write_order_document", write_order_document);
  p.after_root("write_order_document", |ctx_data: ContextData<CreateOrderCtxData>| async move {
    let guard = ctx_data.read();
    if let (Some(order_id), Some(order)) = (&guard.order_id, &guard.validated) {
      info!(%order_id, order_name = %order.order_name, max_participants = order.max_participants, "Create-order pipeline finished.");
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });
  p
}

pub fn register_create_order_pipeline(flows: &Registry<AppError>) {
  flows.register_pipeline(build_create_order_pipeline());
}

async fn validate_order_form(ctx_data: ContextData<CreateOrderCtxData>) -> Result<PipelineControl> {
  let form = ctx_data.read().form.clone();
  match form.validate_now() {
    Ok(order) => {
      ctx_data.write().validated = Some(order);
      Ok(PipelineControl::Continue)
    }
    Err(fields) => {
      warn!(%fields, "Create-order form rejected.");
      Err(AppError::Validation(fields))
    }
  }
}

async fn write_order_document(ctx_data: ContextData<CreateOrderCtxData>) -> Result<PipelineControl> {
  let (backend, order) = {
    let guard = ctx_data.read();
    (guard.backend.clone(), guard.validated.clone())
  };
  let order = order.ok_or_else(|| AppError::Internal("Order form was not validated before writing.".to_string()))?;
  let order_id = create_group_order(&backend, &order).await?;
  ctx_data.write().order_id = Some(order_id);
  Ok(PipelineControl::Continue)
}

/// Runs the create-order pipeline and returns the new order's id.
#[instrument(name = "pipeline::create_order", skip_all, err(Display))]
pub async fn submit_order(flows: &Registry<AppError>, backend: Backend, form: CreateOrderForm) -> Result<String> {
  let ctx_data = ContextData::new(CreateOrderCtxData::new(backend, form));
  match flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => ctx_data
      .read()
      .order_id
      .clone()
      .ok_or_else(|| AppError::Internal("Create-order pipeline completed without an order id.".to_string())),
    PipelineResult::Stopped => Err(AppError::Internal("Create-order pipeline was halted.".to_string())),
  }
}
