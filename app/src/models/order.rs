// app/src/models/order.rs

use crate::schemas::NewOrder;
use crate::store::{Document, StoreResult, Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order as stored under `orders/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
  pub order_name: String,
  #[serde(default)]
  pub order_description: Option<String>,
  pub owner_uid: String,
  pub max_participants: u32,
  #[serde(default)]
  pub participants_count: u32,
  pub last_order_at: Timestamp,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub created_at: Option<Timestamp>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<Timestamp>,
}

impl OrderDocument {
  /// A fresh order owned by `owner_uid`. Creation times are left to the store.
  pub fn from_new(order: &NewOrder, owner_uid: &str) -> Self {
    Self {
      order_name: order.order_name.clone(),
      order_description: order.order_description.clone(),
      owner_uid: owner_uid.to_string(),
      max_participants: order.max_participants,
      participants_count: 0,
      last_order_at: Timestamp::from_datetime(order.last_order_at),
      created_at: None,
      updated_at: None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
  pub id: String,
  pub order_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_description: Option<String>,
  pub owner_uid: String,
  pub max_participants: u32,
  pub participants_count: u32,
  pub last_order_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
}

impl OrderDetail {
  /// `read_at` stands in for a creation time the store has not filled in.
  pub fn from_document(doc: &Document, read_at: DateTime<Utc>) -> StoreResult<Self> {
    let stored: OrderDocument = doc.decode()?;
    Ok(Self {
      id: doc.id.clone(),
      order_name: stored.order_name,
      order_description: stored.order_description,
      owner_uid: stored.owner_uid,
      max_participants: stored.max_participants,
      participants_count: stored.participants_count,
      last_order_at: stored.last_order_at.to_datetime().unwrap_or(read_at),
      created_at: stored.created_at.and_then(Timestamp::to_datetime).unwrap_or(read_at),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn stored_shape_is_camel_case_without_unset_times() {
    let order = NewOrder {
      order_name: "Order Bubble Tea".to_string(),
      order_description: None,
      max_participants: 5,
      last_order_at: DateTime::from_timestamp(1_900_000_000, 0).unwrap(),
    };
    let value = serde_json::to_value(OrderDocument::from_new(&order, "uid-1")).unwrap();
    assert_eq!(value["orderName"], json!("Order Bubble Tea"));
    assert_eq!(value["ownerUid"], json!("uid-1"));
    assert_eq!(value["participantsCount"], json!(0));
    assert_eq!(value["lastOrderAt"], json!({ "seconds": 1_900_000_000, "nanos": 0 }));
    assert!(value.get("createdAt").is_none());
  }

  #[test]
  fn detail_falls_back_to_read_time_without_created_at() {
    let doc = Document {
      id: "o1".to_string(),
      fields: json!({
        "orderName": "Lunch",
        "ownerUid": "uid-1",
        "maxParticipants": 3,
        "participantsCount": 0,
        "lastOrderAt": { "seconds": 1_900_000_000, "nanos": 0 },
        "createdAt": null
      })
      .as_object()
      .unwrap()
      .clone(),
    };
    let read_at = Utc::now();
    let detail = OrderDetail::from_document(&doc, read_at).unwrap();
    assert_eq!(detail.id, "o1");
    assert_eq!(detail.created_at, read_at);
    assert_eq!(detail.order_description, None);
  }
}
