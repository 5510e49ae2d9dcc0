// app/src/services/mod.rs

//! Operations over the backend: order read/write, item upsert and the
//! realtime item subscription.

pub mod items;
pub mod orders;

pub use items::{subscribe_order_items, upsert_order_item, watch_order_items, ItemSnapshots, Unsubscribe};
pub use orders::{create_group_order, get_detail_order};

use crate::errors::{AppError, Result};
use crate::store::{CollectionPath, DocumentPath};

pub const ORDERS_COLLECTION: &str = "orders";
pub const ITEMS_COLLECTION: &str = "items";

/// `orders/{order_id}`. Ids that cannot name a single document are not found.
pub fn order_path(order_id: &str) -> Result<DocumentPath> {
  if order_id.is_empty() || order_id.contains('/') {
    return Err(AppError::NotFound(format!("Order '{}' not found.", order_id)));
  }
  Ok(CollectionPath::root(ORDERS_COLLECTION).doc(order_id))
}

/// `orders/{order_id}/items`.
pub fn items_collection(order_id: &str) -> Result<CollectionPath> {
  Ok(order_path(order_id)?.sub_collection(ITEMS_COLLECTION))
}
