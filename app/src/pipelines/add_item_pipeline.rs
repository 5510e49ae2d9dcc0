// app/src/pipelines/add_item_pipeline.rs

use crate::backend::Backend;
use crate::errors::{AppError, Result};
use crate::models::UpsertOutcome;
use crate::pipelines::contexts::AddItemCtxData;
use crate::schemas::AddItemForm;
use crate::services::upsert_order_item;
use patungan_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use tracing::{instrument, warn};

pub const STEPS: &[&str] = &["validate_item_form", "upsert_item_document"];

pub fn build_add_item_pipeline() -> Pipeline<AddItemCtxData, AppError> {
  let mut p = Pipeline::<AddItemCtxData, AppError>::new(STEPS);

  p.on_root("validate_item_form", |ctx_data: ContextData<AddItemCtxData>| async move {
    let form = ctx_data.read().form.clone();
    let submission = form.validate_submission().map_err(|fields| {
      warn!(%fields, "Add-item form rejected.");
      AppError::Validation(fields)
    })?;
    ctx_data.write().validated = Some(submission);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on_root("upsert_item_document", |ctx_data: ContextData<AddItemCtxData>| async move {
    let (backend, order_id, submission) = {
      let guard = ctx_data.read();
      (guard.backend.clone(), guard.order_id.clone(), guard.validated.clone())
    };
    let submission =
      submission.ok_or_else(|| AppError::Internal("Item form was not validated before upserting.".to_string()))?;
    let outcome = upsert_order_item(&backend, &order_id, &submission).await?;
    ctx_data.write().outcome = Some(outcome);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p
}

pub fn register_add_item_pipeline(flows: &Registry<AppError>) {
  flows.register_pipeline(build_add_item_pipeline());
}

/// Runs the add-item pipeline for the caller in `backend`.
#[instrument(name = "pipeline::add_item", skip(flows, backend, form), err(Display))]
pub async fn submit_item(
  flows: &Registry<AppError>,
  backend: Backend,
  order_id: &str,
  form: AddItemForm,
) -> Result<UpsertOutcome> {
  let ctx_data = ContextData::new(AddItemCtxData::new(backend, order_id, form));
  match flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => ctx_data
      .read()
      .outcome
      .clone()
      .ok_or_else(|| AppError::Internal("Add-item pipeline completed without an outcome.".to_string())),
    PipelineResult::Stopped => Err(AppError::Internal("Add-item pipeline was halted.".to_string())),
  }
}
