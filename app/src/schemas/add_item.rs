// app/src/schemas/add_item.rs

use super::{char_len, rule, trimmed_optional, FieldErrors};
use crate::models::ItemLine;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const FIELD_ORDER: &[&str] = &["participantName", "items", "note"];

pub const MAX_ITEM_LINES: usize = 10;

/// Largest quantity a stored item line can carry.
pub const MAX_QUANTITY: i64 = u32::MAX as i64;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ItemLineForm {
  #[validate(custom(function = "item_name_bounds"))]
  pub item_name: String,

  #[validate(custom(function = "quantity_bounds"))]
  pub quantity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddItemForm {
  #[validate(custom(function = "participant_name_bounds"))]
  pub participant_name: String,

  /// Lines are checked one by one in `validate_submission` so that their
  /// errors survive alongside a failed count check.
  #[serde(default)]
  #[validate(custom(function = "item_count"))]
  pub items: Vec<ItemLineForm>,

  #[serde(default)]
  #[validate(length(max = 200, code = "too-long", message = "Note must be at most 200 characters"))]
  pub note: Option<String>,
}

/// An add-item form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSubmission {
  pub participant_name: String,
  pub items: Vec<ItemLine>,
  pub note: Option<String>,
}

fn participant_name_bounds(name: &str) -> Result<(), ValidationError> {
  match char_len(name) {
    0 => Err(rule("required", "Participant name is required")),
    n if n > 50 => Err(rule("too-long", "Participant name must be at most 50 characters")),
    _ => Ok(()),
  }
}

fn item_name_bounds(name: &str) -> Result<(), ValidationError> {
  match char_len(name) {
    0 => Err(rule("required", "Item name is required")),
    n if n > 100 => Err(rule("too-long", "Item name must be at most 100 characters")),
    _ => Ok(()),
  }
}

fn quantity_bounds(quantity: i64) -> Result<(), ValidationError> {
  if quantity < 1 {
    Err(rule("too-small", "Quantity must be at least 1"))
  } else if quantity > MAX_QUANTITY {
    Err(rule("too-large", "Quantity is too large"))
  } else {
    Ok(())
  }
}

fn item_count(items: &[ItemLineForm]) -> Result<(), ValidationError> {
  if items.is_empty() {
    Err(rule("too-few", "At least one item is required"))
  } else if items.len() > MAX_ITEM_LINES {
    Err(rule("too-many", "You can add up to 10 items only"))
  } else {
    Ok(())
  }
}

impl AddItemForm {
  fn trimmed(&self) -> Self {
    Self {
      participant_name: self.participant_name.trim().to_string(),
      items: self
        .items
        .iter()
        .map(|line| ItemLineForm {
          item_name: line.item_name.trim().to_string(),
          quantity: line.quantity,
        })
        .collect(),
      note: trimmed_optional(&self.note),
    }
  }

  pub fn validate_submission(&self) -> Result<ItemSubmission, FieldErrors> {
    let form = self.trimmed();
    let mut errors = match form.validate() {
      Ok(()) => FieldErrors::default(),
      Err(e) => FieldErrors::from_validation(&e),
    };
    for (index, line) in form.items.iter().enumerate() {
      if let Err(e) = line.validate() {
        errors.extend_at(&format!("items[{}]", index), &e);
      }
    }
    if !errors.is_empty() {
      return Err(errors.ordered_by(FIELD_ORDER));
    }

    // Bounds were checked above; a failed conversion still reports instead of clamping.
    let items = form
      .items
      .into_iter()
      .enumerate()
      .map(|(index, line)| {
        u32::try_from(line.quantity)
          .map(|quantity| ItemLine {
            item_name: line.item_name,
            quantity,
          })
          .map_err(|_| {
            let mut errors = FieldErrors::default();
            errors.insert(&format!("items[{}].quantity", index), "too-large", "Quantity is too large");
            errors
          })
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(ItemSubmission {
      participant_name: form.participant_name,
      items,
      note: form.note,
    })
  }
}
