// app/src/pipelines/contexts.rs

//! Data carried through each pipeline run. Handlers receive these wrapped in
//! `ContextData`.

use crate::backend::Backend;
use crate::models::UpsertOutcome;
use crate::schemas::{AddItemForm, CreateOrderForm, ItemSubmission, NewOrder};

#[derive(Clone, Debug)]
pub struct CreateOrderCtxData {
  pub backend: Backend,
  pub form: CreateOrderForm,
  pub validated: Option<NewOrder>,
  pub order_id: Option<String>,
}

impl CreateOrderCtxData {
  pub fn new(backend: Backend, form: CreateOrderForm) -> Self {
    Self {
      backend,
      form,
      validated: None,
      order_id: None,
    }
  }
}

#[derive(Clone, Debug)]
pub struct AddItemCtxData {
  pub backend: Backend,
  pub order_id: String,
  pub form: AddItemForm,
  pub validated: Option<ItemSubmission>,
  pub outcome: Option<UpsertOutcome>,
}

impl AddItemCtxData {
  pub fn new(backend: Backend, order_id: impl Into<String>, form: AddItemForm) -> Self {
    Self {
      backend,
      order_id: order_id.into(),
      form,
      validated: None,
      outcome: None,
    }
  }
}
