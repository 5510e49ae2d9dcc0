// flow/src/core/step.rs

/// A named step. Handlers are attached to it by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
}

impl StepDef {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }
}
