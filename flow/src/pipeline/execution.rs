// flow/src/pipeline/execution.rs

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::{Phase, Pipeline};
use tracing::{event, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step in order against `ctx_data`.
  ///
  /// Within a step the phases run before → on → after, and handlers within a
  /// phase run in registration order. The first error is returned as-is; a
  /// `Stop` ends the run with `PipelineResult::Stopped`. A step with no
  /// handlers at all fails with `FlowError::HandlerMissing`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_index, step) in self.steps.iter().enumerate() {
      let step_name = step.name.as_str();
      let step_span = tracing::info_span!("pipeline_step", step_name, step_index);

      let has_any = Phase::ALL
        .iter()
        .any(|phase| !self.handlers_for(step_name, *phase).is_empty());
      if !has_any {
        event!(parent: &step_span, Level::ERROR, "Step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step.name.clone(),
        }));
      }

      for phase in Phase::ALL {
        for (handler_index, handler) in self.handlers_for(step_name, phase).iter().enumerate() {
          let handler_span =
            tracing::debug_span!(parent: &step_span, "handler", phase = phase.as_str(), handler_index);
          match handler(ctx_data.clone()).instrument(handler_span).await {
            Ok(PipelineControl::Continue) => {}
            Ok(PipelineControl::Stop) => {
              event!(parent: &step_span, Level::INFO, phase = phase.as_str(), "Pipeline stopped by handler.");
              return Ok(PipelineResult::Stopped);
            }
            Err(e) => {
              event!(parent: &step_span, Level::WARN, phase = phase.as_str(), error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }
      event!(parent: &step_span, Level::DEBUG, "Step finished.");
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
