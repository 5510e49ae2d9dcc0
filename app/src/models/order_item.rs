// app/src/models/order_item.rs

use crate::store::{Document, Fields, Timestamp};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLine {
  pub item_name: String,
  pub quantity: u32,
}

/// Item document as stored under `orders/{orderId}/items/{uid}`. Every field
/// is optional on read; documents written by older clients may lack some.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderItemDocument {
  pub participant_name: String,
  pub note: Option<String>,
  pub items: Vec<ItemLine>,
  pub created_by: String,
  pub created_at: Option<Timestamp>,
  pub updated_at: Option<Timestamp>,
}

impl OrderItemDocument {
  /// Reads each field on its own: a missing or mistyped field takes its
  /// default without affecting the others, and unreadable item lines are
  /// skipped.
  pub fn from_document(doc: &Document) -> Self {
    let fields = &doc.fields;
    let items = match fields.get("items") {
      Some(Value::Array(lines)) => lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| match serde_json::from_value(line.clone()) {
          Ok(line) => Some(line),
          Err(e) => {
            warn!(item_id = %doc.id, index, error = %e, "Skipping unreadable item line.");
            None
          }
        })
        .collect(),
      None | Some(Value::Null) => Vec::new(),
      Some(_) => {
        warn!(item_id = %doc.id, field = "items", "Item field has the wrong type; using its default.");
        Vec::new()
      }
    };
    Self {
      participant_name: lenient(doc, fields, "participantName"),
      note: lenient(doc, fields, "note"),
      items,
      created_by: lenient(doc, fields, "createdBy"),
      created_at: lenient(doc, fields, "createdAt"),
      updated_at: lenient(doc, fields, "updatedAt"),
    }
  }
}

fn lenient<T: DeserializeOwned + Default>(doc: &Document, fields: &Fields, name: &'static str) -> T {
  match fields.get(name) {
    None | Some(Value::Null) => T::default(),
    Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
      warn!(item_id = %doc.id, field = name, error = %e, "Item field has the wrong type; using its default.");
      T::default()
    }),
  }
}

/// One participant's submission as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailItem {
  pub id: String,
  pub participant_name: String,
  pub note: Option<String>,
  pub items: Vec<ItemLine>,
  pub created_by: String,
  pub created_at: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl OrderDetailItem {
  /// Lenient mapping: unreadable fields fall back to their defaults and a
  /// missing `createdAt` becomes `delivered_at`.
  pub fn from_document(doc: &Document, delivered_at: DateTime<Utc>) -> Self {
    let stored = OrderItemDocument::from_document(doc);
    Self {
      id: doc.id.clone(),
      participant_name: stored.participant_name,
      note: stored.note,
      items: stored.items,
      created_by: stored.created_by,
      created_at: stored.created_at.and_then(Timestamp::to_datetime).unwrap_or(delivered_at),
      updated_at: stored.updated_at.and_then(Timestamp::to_datetime),
    }
  }
}

/// Result of an item upsert, carrying the participant id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
  Created(String),
  Updated(String),
}

impl UpsertOutcome {
  pub fn id(&self) -> &str {
    match self {
      UpsertOutcome::Created(id) | UpsertOutcome::Updated(id) => id,
    }
  }

  pub fn was_created(&self) -> bool {
    matches!(self, UpsertOutcome::Created(_))
  }
}
