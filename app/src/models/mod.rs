// app/src/models/mod.rs

//! Stored document shapes and the read models built from them.

pub mod order;
pub mod order_item;

pub use order::{OrderDetail, OrderDocument};
pub use order_item::{ItemLine, OrderDetailItem, OrderItemDocument, UpsertOutcome};
