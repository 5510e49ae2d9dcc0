// flow/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use patungan_flow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

/// Context used across engine tests: records which handler ran, in order.
#[derive(Clone, Debug, Default)]
pub struct Tally {
  pub trail: Vec<String>,
  pub total: i64,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TallyError {
  #[error("engine: {0}")]
  Flow(String),

  #[error("handler rejected: {0}")]
  Rejected(String),
}

impl From<FlowError> for TallyError {
  fn from(err: FlowError) -> Self {
    TallyError::Flow(format!("{:?}", err))
  }
}

/// Appends `label` to the trail and adds `amount`; stops if `stop_at` names this label.
pub fn record(label: &'static str, amount: i64) -> Handler<Tally, TallyError> {
  Box::new(move |ctx: ContextData<Tally>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.trail.push(label.to_string());
      guard.total += amount;
      if guard.stop_at.as_deref() == Some(label) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn reject(label: &'static str, reason: &'static str) -> Handler<Tally, TallyError> {
  Box::new(move |ctx: ContextData<Tally>| {
    Box::pin(async move {
      ctx.write().trail.push(label.to_string());
      Err(TallyError::Rejected(reason.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
