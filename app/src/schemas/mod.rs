// app/src/schemas/mod.rs

//! Form schemas. Each form deserializes from the wire, trims itself, runs its
//! `validator` constraints and yields either a typed payload or `FieldErrors`.

pub mod add_item;
pub mod create_order;

pub use add_item::{AddItemForm, ItemLineForm, ItemSubmission};
pub use create_order::{CreateOrderForm, DeadlineInput, NewOrder};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub code: String,
  pub message: String,
}

/// Failed fields keyed by path (`orderName`, `items[0].itemName`), kept in
/// form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, FieldError)>);

impl FieldErrors {
  pub fn from_validation(errors: &ValidationErrors) -> Self {
    let mut out = FieldErrors::default();
    flatten(None, errors, &mut out);
    out
  }

  /// Adds the errors of a nested value under `prefix`, e.g. `items[3]`.
  pub(crate) fn extend_at(&mut self, prefix: &str, errors: &ValidationErrors) {
    flatten(Some(prefix), errors, self);
  }

  pub fn insert(&mut self, path: &str, code: &str, message: &str) {
    self.0.retain(|(p, _)| p != path);
    self.0.push((
      path.to_string(),
      FieldError {
        code: code.to_string(),
        message: message.to_string(),
      },
    ));
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn get(&self, path: &str) -> Option<&FieldError> {
    self.0.iter().find(|(p, _)| p == path).map(|(_, e)| e)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
    self.0.iter().map(|(p, e)| (p.as_str(), e))
  }

  /// The entry a form would surface first.
  pub fn first(&self) -> Option<(&str, &FieldError)> {
    self.iter().next()
  }

  /// Path → message, for response bodies.
  pub fn messages(&self) -> BTreeMap<String, String> {
    self.0.iter().map(|(p, e)| (p.clone(), e.message.clone())).collect()
  }

  /// `items[0].itemName` → `items`.
  pub fn top_level(path: &str) -> &str {
    path.split(['.', '[']).next().unwrap_or(path)
  }

  /// Sorts entries by the position of their top-level field in `order`,
  /// then by path.
  pub(crate) fn ordered_by(mut self, order: &[&str]) -> Self {
    let rank = |path: &str| {
      let top = Self::top_level(path);
      order.iter().position(|f| *f == top).unwrap_or(order.len())
    };
    self.0.sort_by(|(a, _), (b, _)| rank(a).cmp(&rank(b)).then_with(|| natural_path_cmp(a, b)));
    self
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.0.iter().map(|(p, e)| format!("{}: {}", p, e.message)).collect();
    f.write_str(&parts.join("; "))
  }
}

fn flatten(prefix: Option<&str>, errors: &ValidationErrors, out: &mut FieldErrors) {
  for (field, kind) in errors.errors() {
    let name = camel_case(field);
    let path = match prefix {
      Some(p) => format!("{}.{}", p, name),
      None => name,
    };
    match kind {
      ValidationErrorsKind::Field(errs) => {
        if let Some(first) = errs.first() {
          let message = first
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| first.code.to_string());
          out.insert(&path, &first.code, &message);
        }
      }
      ValidationErrorsKind::Struct(inner) => flatten(Some(&path), inner, out),
      ValidationErrorsKind::List(entries) => {
        for (index, inner) in entries {
          flatten(Some(&format!("{}[{}]", path, index)), inner, out);
        }
      }
    }
  }
}

// `items[10]` sorts after `items[9]`.
fn natural_path_cmp(a: &str, b: &str) -> std::cmp::Ordering {
  fn key(path: &str) -> Vec<Result<u64, &str>> {
    path
      .split(['[', ']', '.'])
      .filter(|s| !s.is_empty())
      .map(|s| s.parse::<u64>().map_err(|_| s))
      .collect()
  }
  key(a).cmp(&key(b))
}

fn camel_case(field: &str) -> String {
  let mut out = String::with_capacity(field.len());
  let mut upper = false;
  for ch in field.chars() {
    if ch == '_' {
      upper = true;
    } else if upper {
      out.extend(ch.to_uppercase());
      upper = false;
    } else {
      out.push(ch);
    }
  }
  out
}

pub(crate) fn rule(code: &'static str, message: &'static str) -> ValidationError {
  ValidationError::new(code).with_message(message.into())
}

pub(crate) fn char_len(value: &str) -> usize {
  value.chars().count()
}

/// Trims, and drops the value entirely when nothing is left.
pub(crate) fn trimmed_optional(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}
