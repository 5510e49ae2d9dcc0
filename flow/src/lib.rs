// flow/src/lib.rs

//! patungan-flow: a small async step-pipeline engine.
//!
//! A pipeline is an ordered list of named steps run against one shared,
//! lockable context. Each step may carry `before`, `on` and `after` handlers.
//! Any handler can stop the run early or fail it. A type-keyed registry lets
//! callers dispatch a run by handing over nothing but the context.
//!
//! The patungan service uses it for its two write flows: creating an order
//! and submitting a participant's items.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Registry;

/*
    Typical use:
    1. Define a context struct `MyCtx` holding inputs and slots for outputs.
    2. Build `Pipeline::<MyCtx, MyError>::new(&["step_a", "step_b"])`.
    3. Attach handlers with `.on_root("step_a", |ctx| async move { ... })`.
    4. Register it: `registry.register_pipeline(pipeline)`.
    5. Run: `registry.run(ContextData::new(my_ctx)).await`, then read outputs
       back out of the same `ContextData`.
*/
