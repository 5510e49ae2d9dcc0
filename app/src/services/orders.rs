// app/src/services/orders.rs

use super::{order_path, ORDERS_COLLECTION};
use crate::backend::Backend;
use crate::errors::{AppError, Result};
use crate::models::{OrderDetail, OrderDocument};
use crate::schemas::NewOrder;
use crate::store::{CollectionPath, DocumentWrite};
use chrono::Utc;
use tracing::{info, instrument};

/// Writes a new order owned by the caller and returns its generated id.
///
/// Fails with `backend-unavailable` before checking the caller, and with
/// `unauthenticated` when nobody is signed in. Nothing is retried.
#[instrument(name = "orders::create_group_order", skip(backend, order), fields(order_name = %order.order_name), err(Display))]
pub async fn create_group_order(backend: &Backend, order: &NewOrder) -> Result<String> {
  let store = backend.store()?;
  let owner = backend.current_identity()?;

  let write = DocumentWrite::from_serialize(&OrderDocument::from_new(order, owner.uid()))?
    .server_timestamp("createdAt")
    .server_timestamp("updatedAt");
  let order_id = store.insert(&CollectionPath::root(ORDERS_COLLECTION), write).await?;

  info!(%order_id, owner_uid = %owner, "Group order created.");
  Ok(order_id)
}

#[instrument(name = "orders::get_detail_order", skip(backend), err(Display))]
pub async fn get_detail_order(backend: &Backend, order_id: &str) -> Result<OrderDetail> {
  let store = backend.store()?;
  let path = order_path(order_id)?;
  let doc = store
    .get(&path)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order '{}' not found.", order_id)))?;
  Ok(OrderDetail::from_document(&doc, Utc::now())?)
}
